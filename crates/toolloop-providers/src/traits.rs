//! LLM Provider trait: the model-call boundary of the agent loop.

use async_trait::async_trait;
use toolloop_core::types::{Message, ModelResponse, ToolDefinition};

use crate::error::ProviderError;

/// Sampling parameters passed to each model call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one chat request.
    ///
    /// # Arguments
    /// * `system`  : System instructions, if any.
    /// * `messages`: Conversation history in block format.
    /// * `tools`   : Tool definitions the model may call (may be empty).
    /// * `model`   : Model identifier (e.g. `"claude-sonnet-4-20250514"`).
    /// * `config`  : Temperature, max_tokens.
    ///
    /// # Returns
    /// The response normalized to content blocks, or a [`ProviderError`].
    /// Failures are returned as-is and never retried.
    async fn chat(
        &self,
        system: Option<&str>,
        messages: &[Message],
        tools: &[ToolDefinition],
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<ModelResponse, ProviderError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
