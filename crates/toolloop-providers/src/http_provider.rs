//! HTTP provider for OpenAI-compatible `/chat/completions` APIs.
//!
//! Covers OpenAI, OpenRouter, DeepSeek and Gemini's compatibility endpoint.
//! The agent speaks in content blocks; this module translates blocks to the
//! OpenAI message shape on the way out and back into blocks on the way in:
//!
//! - assistant `tool_use` blocks → `tool_calls` (arguments as a JSON string)
//! - user `tool_result` blocks → one `role: "tool"` message per result
//! - response `tool_calls` → `tool_use` blocks (arguments parsed back to JSON)

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use toolloop_core::types::{
    ContentBlock, Message, MessageContent, ModelResponse, Role, ToolDefinition,
    UsageInfo,
};

use crate::error::ProviderError;
use crate::registry::{resolve_model_name, ProviderConfig, ProviderSpec};
use crate::traits::{LlmProvider, LlmRequestConfig};

/// Per-request HTTP timeout shared by all provider clients.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Convert configured extra headers into a `HeaderMap`, skipping invalid ones.
pub(crate) fn extra_header_map(headers: Option<&HashMap<String, String>>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (key, value) in headers.into_iter().flatten() {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(val)) => {
                map.insert(name, val);
            }
            _ => warn!("Invalid header: {}={}", key, value),
        }
    }
    map
}

/// Read a response: non-2xx becomes [`ProviderError::Api`], the body is then
/// decoded as `T`.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        error!(provider = provider, status = %status, body = %body, "API error");
        return Err(ProviderError::Api {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        error!(provider = provider, error = %e, "Failed to parse LLM response");
        ProviderError::Decode(e.to_string())
    })
}

// ─────────────────────────────────────────────
// Wire types (OpenAI chat completions)
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ChatToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: ChatFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatFunctionCall {
    name: String,
    /// JSON-encoded argument object.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ChatTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: ChatFunctionDef<'a>,
}

#[derive(Debug, Serialize)]
struct ChatFunctionDef<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

// ─────────────────────────────────────────────
// Translation
// ─────────────────────────────────────────────

fn to_chat_messages(system: Option<&str>, messages: &[Message]) -> Vec<ChatMessage> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = system {
        out.push(ChatMessage::System {
            content: system.to_string(),
        });
    }

    for msg in messages {
        match msg.role {
            Role::Assistant => {
                let text = msg.text();
                let tool_calls = msg
                    .tool_uses()
                    .into_iter()
                    .map(|call| ChatToolCall {
                        id: call.id,
                        call_type: function_type(),
                        function: ChatFunctionCall {
                            name: call.name,
                            arguments: call.input.to_string(),
                        },
                    })
                    .collect();
                out.push(ChatMessage::Assistant {
                    content: (!text.is_empty()).then_some(text),
                    tool_calls,
                });
            }
            Role::User => {
                for block in msg.blocks() {
                    if let ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        ..
                    } = block
                    {
                        out.push(ChatMessage::Tool {
                            tool_call_id: tool_use_id.clone(),
                            content: content.clone(),
                        });
                    }
                }
                let text = msg.text();
                if !text.is_empty() || matches!(msg.content, MessageContent::Text(_)) {
                    out.push(ChatMessage::User { content: text });
                }
            }
        }
    }
    out
}

fn to_chat_tools(tools: &[ToolDefinition]) -> Vec<ChatTool<'_>> {
    tools
        .iter()
        .map(|t| ChatTool {
            tool_type: "function",
            function: ChatFunctionDef {
                name: &t.name,
                description: &t.description,
                parameters: &t.input_schema,
            },
        })
        .collect()
}

fn from_chat_response(resp: ChatCompletionResponse) -> Result<ModelResponse, ProviderError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Decode("response has no choices".into()))?;

    let mut content = Vec::new();
    if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
        content.push(ContentBlock::text(text));
    }
    for call in choice.message.tool_calls.unwrap_or_default() {
        let input = serde_json::from_str::<Value>(&call.function.arguments).unwrap_or_else(|e| {
            warn!(
                tool = %call.function.name,
                error = %e,
                "Unparseable tool arguments, using empty object"
            );
            Value::Object(Default::default())
        });
        content.push(ContentBlock::tool_use(call.id, call.function.name, input));
    }

    Ok(ModelResponse {
        content,
        stop_reason: choice.finish_reason,
        usage: resp.usage.map(|u| UsageInfo {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        }),
    })
}

// ─────────────────────────────────────────────
// OpenAiCompatProvider
// ─────────────────────────────────────────────

/// A provider that talks to any OpenAI-compatible HTTP API.
pub struct OpenAiCompatProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    default_model: String,
    extra_headers: HeaderMap,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl OpenAiCompatProvider {
    /// Create a new provider from a provider config and spec.
    ///
    /// # Arguments
    /// * `config` : User's config (api_key, api_base, extra_headers)
    /// * `spec`   : Static provider spec from the registry
    /// * `model`  : The default model to use
    pub fn new(
        config: &ProviderConfig,
        spec: &'static ProviderSpec,
        model: &str,
    ) -> Result<Self, ProviderError> {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| spec.default_api_base.to_string());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(OpenAiCompatProvider {
            client,
            api_base,
            api_key: config.api_key.clone(),
            default_model: model.to_string(),
            extra_headers: extra_header_map(config.extra_headers.as_ref()),
            spec,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat(
        &self,
        system: Option<&str>,
        messages: &[Message],
        tools: &[ToolDefinition],
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<ModelResponse, ProviderError> {
        let resolved_model = resolve_model_name(model, self.spec);

        debug!(
            provider = self.spec.display_name,
            model = %resolved_model,
            messages = messages.len(),
            tools = tools.len(),
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model: resolved_model,
            messages: to_chat_messages(system, messages),
            tools: to_chat_tools(tools),
            tool_choice: (!tools.is_empty()).then_some("auto"),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(&request_body)
            .send()
            .await
            .inspect_err(|e| {
                error!(provider = self.spec.display_name, error = %e, "HTTP request failed")
            })?;

        let chat_resp: ChatCompletionResponse =
            read_json(self.spec.display_name, response).await?;
        let resp = from_chat_response(chat_resp)?;

        debug!(
            provider = self.spec.display_name,
            tool_calls = resp.tool_uses().len(),
            stop_reason = resp.stop_reason.as_deref().unwrap_or("?"),
            "LLM response received"
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

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
