//! Native Anthropic Messages API client.
//!
//! The block message model is Anthropic's own wire shape, so history and tool
//! definitions serialize as-is. The system prompt travels as a top-level
//! field, not as a message.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use toolloop_core::types::{ContentBlock, Message, ModelResponse, ToolDefinition, UsageInfo};

use crate::error::ProviderError;
use crate::http_provider::{extra_header_map, read_json, REQUEST_TIMEOUT_SECS};
use crate::registry::{resolve_model_name, ProviderConfig, ProviderSpec};
use crate::traits::{LlmProvider, LlmRequestConfig};

/// Value of the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

impl From<MessagesResponse> for ModelResponse {
    fn from(resp: MessagesResponse) -> Self {
        ModelResponse {
            content: resp
                .content
                .into_iter()
                .filter(|b| !matches!(b, ContentBlock::Unsupported))
                .collect(),
            stop_reason: resp.stop_reason,
            usage: resp.usage,
        }
    }
}

/// Provider for `POST {api_base}/messages`.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    default_model: String,
    extra_headers: HeaderMap,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(
        config: &ProviderConfig,
        spec: &'static ProviderSpec,
        model: &str,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(AnthropicProvider {
            client,
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| spec.default_api_base.to_string()),
            api_key: config.api_key.clone(),
            default_model: model.to_string(),
            extra_headers: extra_header_map(config.extra_headers.as_ref()),
            spec,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn chat(
        &self,
        system: Option<&str>,
        messages: &[Message],
        tools: &[ToolDefinition],
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<ModelResponse, ProviderError> {
        let request_body = MessagesRequest {
            model: resolve_model_name(model, self.spec),
            max_tokens: config.max_tokens,
            system,
            messages,
            tools: (!tools.is_empty()).then_some(tools),
            temperature: config.temperature,
        };

        debug!(
            model = %request_body.model,
            messages = messages.len(),
            tools = tools.len(),
            "Calling Anthropic"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .headers(self.extra_headers.clone())
            .json(&request_body)
            .send()
            .await
            .inspect_err(|e| error!(error = %e, "Anthropic request failed"))?;

        let resp: MessagesResponse = read_json(self.spec.display_name, response).await?;
        let resp = ModelResponse::from(resp);

        debug!(
            tool_calls = resp.tool_uses().len(),
            stop_reason = resp.stop_reason.as_deref().unwrap_or("?"),
            "Anthropic response received"
        );
        Ok(resp)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }
}
