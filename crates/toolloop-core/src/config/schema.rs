//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentDefaults`, `ProvidersConfig`, `SessionConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.toolloop/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentDefaults,
    pub providers: ProvidersConfig,
    pub session: SessionConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Agent settings: model, sampling, loop bound, prompt shaping.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentDefaults {
    /// Model identifier; also selects the provider.
    pub model: String,
    /// Maximum tokens to generate per model call.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 1.0 for Anthropic, up to 2.0 elsewhere).
    pub temperature: f64,
    /// Maximum model calls per user message before giving up.
    pub max_iterations: u32,
    /// Replaces the built-in system prompt when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Only send the last N user turns to the model. Unset = whole history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_turns: Option<usize>,
    /// Add the current date/time to the system prompt.
    pub inject_datetime: bool,
    /// Add the session state (preferences etc.) to the system prompt.
    pub inject_session_state: bool,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            max_iterations: 10,
            system_prompt: None,
            history_turns: None,
            inject_datetime: false,
            inject_session_state: true,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single LLM provider (API key, base URL, headers).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// All provider configurations, one per supported backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub anthropic: ProviderConfig,
    pub openai: ProviderConfig,
    pub openrouter: ProviderConfig,
    pub deepseek: ProviderConfig,
    pub gemini: ProviderConfig,
}

impl ProvidersConfig {
    /// Get a provider config by name (e.g. `"anthropic"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "anthropic" => Some(&self.anthropic),
            "openai" => Some(&self.openai),
            "openrouter" => Some(&self.openrouter),
            "deepseek" => Some(&self.deepseek),
            "gemini" => Some(&self.gemini),
            _ => None,
        }
    }

    /// Convert to a map keyed by provider name, for the provider registry.
    pub fn to_map(&self) -> HashMap<String, ProviderConfig> {
        let entries: [(&str, &ProviderConfig); 5] = [
            ("anthropic", &self.anthropic),
            ("openai", &self.openai),
            ("openrouter", &self.openrouter),
            ("deepseek", &self.deepseek),
            ("gemini", &self.gemini),
        ];
        entries
            .into_iter()
            .map(|(name, config)| (name.to_string(), config.clone()))
            .collect()
    }
}

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// Identity and starting state for the per-conversation tool context.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub user_id: String,
    pub session_id: String,
    /// Initial key/value state handed to tools. Must be a JSON object.
    pub initial_state: Value,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: "user_12345".to_string(),
            session_id: "main_session".to_string(),
            initial_state: json!({
                "preferences": {
                    "favorite_color": "blue",
                    "favorite_food": "pizza",
                    "preferred_language": "English"
                }
            }),
        }
    }
}
