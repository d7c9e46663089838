//! LLM provider layer for toolloop.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`]: trait that all providers implement
//! - [`registry`]: static specs for the supported providers + matching logic
//! - [`anthropic::AnthropicProvider`]: native Anthropic Messages API client
//! - [`http_provider::OpenAiCompatProvider`]: OpenAI-compatible chat completions client
//! - [`registry::create_provider`]: builds the right client from model name + config

pub mod anthropic;
pub mod error;
pub mod http_provider;
pub mod registry;
pub mod traits;

pub use anthropic::AnthropicProvider;
pub use error::ProviderError;
pub use http_provider::OpenAiCompatProvider;
pub use registry::{create_provider, ApiStyle, ProviderConfig, ProviderSpec, PROVIDERS};
pub use traits::{LlmProvider, LlmRequestConfig};
