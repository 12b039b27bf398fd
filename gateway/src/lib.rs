//! ModelGate - streaming gateway between browser clients and the inference
//! service.
//!
//! The gateway resolves per-model generation presets, issues chat/compare
//! requests to the upstream inference service and relays its event-framed
//! response streams back to clients over SSE.

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod presets;
pub mod relay;
pub mod routes;
pub mod test_util;
pub mod upstream;

pub use config::{Config, ConfigError, CorsConfig, LoggingConfig, UpstreamConfig};
pub use error::{Error, Result};
pub use presets::{merge_params, PresetCatalog, PresetTable};
pub use relay::{
    ChannelSink, DownstreamSink, FrameParser, RelaySession, SessionOutcome, SinkClosed, SseFrame,
    WireEvent,
};
pub use upstream::{InferenceClient, LoadedModel, UpstreamChatRequest, UpstreamCompareRequest};

use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub upstream: InferenceClient,
    pub presets: Arc<PresetCatalog>,
}
