//! HTTP client for the inference service.

mod client;

pub use client::{InferenceClient, LoadedModel, UpstreamChatRequest, UpstreamCompareRequest};
