//! The streaming relay subsystem.
//!
//! [`FrameParser`] turns the upstream byte stream into discrete wire events
//! regardless of how chunk boundaries fall; [`RelaySession`] drives one
//! client-facing request, transforming events per mode and writing them to a
//! [`DownstreamSink`]. A failed downstream write stops the upstream read
//! immediately.

mod frame;
mod session;
mod sink;

pub use frame::{FrameParser, WireEvent};
pub use session::{RelaySession, SessionOutcome};
pub use sink::{ChannelSink, DownstreamSink, SinkClosed, SseFrame};
