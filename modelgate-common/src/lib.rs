//! ModelGate Common Types
//!
//! Shared wire types used by the gateway and by clients speaking its API.

pub mod chat;
pub mod preset;
pub mod stream;

pub use chat::{
    ChatMessage, ChatRequest, CompareRequest, ContentPart, GenerationParams, MessageContent,
};
pub use preset::{short_name, ModelCategory, ParamBounds, Preset};
pub use stream::{ChatStreamChunk, StreamError, DONE_SENTINEL};
