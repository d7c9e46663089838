//! Provider registry: static specs for the supported LLM providers.
//!
//! Each `ProviderSpec` describes how to reach one provider: keywords for
//! model matching, wire format, default API base, gateway behaviour.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::anthropic::AnthropicProvider;
use crate::error::ProviderError;
use crate::http_provider::OpenAiCompatProvider;
use crate::traits::LlmProvider;

/// The provider config lives in core.
pub use toolloop_core::config::ProviderConfig;

// ─────────────────────────────────────────────
// ProviderSpec: static metadata for one provider
// ─────────────────────────────────────────────

/// Which HTTP dialect a provider speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiStyle {
    /// `POST /messages` with typed content blocks.
    AnthropicMessages,
    /// `POST /chat/completions` with `tool_calls` / `tool` messages.
    OpenAiChat,
}

/// Static description of one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"openrouter"`), also the config key.
    pub name: &'static str,
    /// Keywords to match in model names (lowercase).
    pub keywords: &'static [&'static str],
    /// Conventional environment variable for the API key.
    pub env_key: &'static str,
    /// Human-readable name for logs.
    pub display_name: &'static str,
    pub api_style: ApiStyle,
    /// Gateways (OpenRouter) serve many vendors and are used as fallback.
    pub is_gateway: bool,
    /// If the API key starts with this prefix, this provider is meant.
    pub detect_by_key_prefix: Option<&'static str>,
    pub default_api_base: &'static str,
}

/// Supported providers, in matching priority order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openrouter",
        keywords: &["openrouter"],
        env_key: "OPENROUTER_API_KEY",
        display_name: "OpenRouter",
        api_style: ApiStyle::OpenAiChat,
        is_gateway: true,
        detect_by_key_prefix: Some("sk-or-"),
        default_api_base: "https://openrouter.ai/api/v1",
    },
    ProviderSpec {
        name: "anthropic",
        keywords: &["anthropic", "claude"],
        env_key: "ANTHROPIC_API_KEY",
        display_name: "Anthropic",
        api_style: ApiStyle::AnthropicMessages,
        is_gateway: false,
        detect_by_key_prefix: None,
        default_api_base: "https://api.anthropic.com/v1",
    },
    ProviderSpec {
        name: "openai",
        keywords: &["openai", "gpt"],
        env_key: "OPENAI_API_KEY",
        display_name: "OpenAI",
        api_style: ApiStyle::OpenAiChat,
        is_gateway: false,
        detect_by_key_prefix: None,
        default_api_base: "https://api.openai.com/v1",
    },
    ProviderSpec {
        name: "deepseek",
        keywords: &["deepseek"],
        env_key: "DEEPSEEK_API_KEY",
        display_name: "DeepSeek",
        api_style: ApiStyle::OpenAiChat,
        is_gateway: false,
        detect_by_key_prefix: None,
        default_api_base: "https://api.deepseek.com/v1",
    },
    ProviderSpec {
        name: "gemini",
        keywords: &["gemini"],
        env_key: "GEMINI_API_KEY",
        display_name: "Gemini",
        api_style: ApiStyle::OpenAiChat,
        is_gateway: false,
        detect_by_key_prefix: None,
        default_api_base: "https://generativelanguage.googleapis.com/v1beta/openai",
    },
];

// ─────────────────────────────────────────────
// Matching functions
// ─────────────────────────────────────────────

/// Find a direct (non-gateway) provider spec by keyword match on the model name.
pub fn find_by_model(model: &str) -> Option<&'static ProviderSpec> {
    let model_lower = model.to_lowercase();
    PROVIDERS.iter().find(|spec| {
        !spec.is_gateway && spec.keywords.iter().any(|kw| model_lower.contains(kw))
    })
}

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Detect a gateway from the shape of an API key (e.g. `sk-or-...`).
pub fn find_by_key_prefix(api_key: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| {
        spec.detect_by_key_prefix
            .is_some_and(|pfx| api_key.starts_with(pfx))
    })
}

/// Resolve the model name sent on the wire.
///
/// - Direct providers: strip a redundant `<provider>/` prefix
///   (`"anthropic/claude-x"` → `"claude-x"`).
/// - Gateways: models without a vendor prefix get one from keyword matching
///   (`"claude-x"` → `"anthropic/claude-x"`); prefixed models pass through.
pub fn resolve_model_name(model: &str, spec: &ProviderSpec) -> String {
    if spec.is_gateway {
        if model.contains('/') {
            return model.to_string();
        }
        return match find_by_model(model) {
            Some(vendor) => format!("{}/{}", vendor.name, model),
            None => model.to_string(),
        };
    }

    model
        .strip_prefix(spec.name)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(model)
        .to_string()
}

/// Match a model name to a configured provider.
///
/// 1. Keyword match, only if that provider has an API key. A key that
///    belongs to a gateway (by prefix) routes through that gateway instead.
/// 2. Fallback to the first configured gateway.
pub fn match_provider<'a>(
    model: &str,
    providers: &'a HashMap<String, ProviderConfig>,
) -> Option<(&'a ProviderConfig, &'static ProviderSpec)> {
    if let Some(spec) = find_by_model(model) {
        if let Some(config) = providers.get(spec.name).filter(|c| c.is_configured()) {
            let spec = find_by_key_prefix(&config.api_key).unwrap_or(spec);
            return Some((config, spec));
        }
    }

    PROVIDERS
        .iter()
        .filter(|s| s.is_gateway)
        .find_map(|spec| {
            providers
                .get(spec.name)
                .filter(|c| c.is_configured())
                .map(|c| (c, spec))
        })
}

// ─────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────

/// Build the provider client for `model` from the configured providers.
///
/// This is the main entry point: it matches the model to a provider spec,
/// reads that provider's config, and creates the client for its wire format.
pub fn create_provider(
    model: &str,
    providers: &HashMap<String, ProviderConfig>,
) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    let (config, spec) = match_provider(model, providers)
        .ok_or_else(|| ProviderError::NoProvider(model.to_string()))?;

    debug!(
        provider = spec.display_name,
        model = model,
        api_base = config.api_base.as_deref().unwrap_or(spec.default_api_base),
        "Creating LLM provider"
    );

    let provider: Arc<dyn LlmProvider> = match spec.api_style {
        ApiStyle::AnthropicMessages => Arc::new(AnthropicProvider::new(config, spec, model)?),
        ApiStyle::OpenAiChat => Arc::new(OpenAiCompatProvider::new(config, spec, model)?),
    };
    Ok(provider)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(key: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: key.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_by_model_claude() {
        let spec = find_by_model("claude-sonnet-4-20250514").unwrap();
        assert_eq!(spec.name, "anthropic");
        assert_eq!(spec.api_style, ApiStyle::AnthropicMessages);
    }

    #[test]
    fn test_find_by_model_gpt() {
        assert_eq!(find_by_model("gpt-4o-mini").unwrap().name, "openai");
    }

    #[test]
    fn test_find_by_model_skips_gateways() {
        assert!(find_by_model("openrouter/auto").is_none());
    }

    #[test]
    fn test_find_by_model_unknown() {
        assert!(find_by_model("llama-3-70b").is_none());
    }

    #[test]
    fn test_find_by_key_prefix() {
        assert_eq!(find_by_key_prefix("sk-or-abc").unwrap().name, "openrouter");
        assert!(find_by_key_prefix("sk-ant-abc").is_none());
    }

    #[test]
    fn test_resolve_strips_own_prefix() {
        let spec = find_by_name("anthropic").unwrap();
        assert_eq!(
            resolve_model_name("anthropic/claude-sonnet-4-20250514", spec),
            "claude-sonnet-4-20250514"
        );
        assert_eq!(resolve_model_name("claude-3-haiku", spec), "claude-3-haiku");
    }

    #[test]
    fn test_resolve_gateway_prefixes_vendor() {
        let spec = find_by_name("openrouter").unwrap();
        assert_eq!(
            resolve_model_name("claude-sonnet-4-20250514", spec),
            "anthropic/claude-sonnet-4-20250514"
        );
        assert_eq!(resolve_model_name("meta-llama/llama-3", spec), "meta-llama/llama-3");
        assert_eq!(resolve_model_name("mystery-model", spec), "mystery-model");
    }

    #[test]
    fn test_match_direct_provider() {
        let mut providers = HashMap::new();
        providers.insert("anthropic".to_string(), configured("sk-ant-123"));

        let (config, spec) = match_provider("claude-sonnet-4-20250514", &providers).unwrap();
        assert_eq!(spec.name, "anthropic");
        assert_eq!(config.api_key, "sk-ant-123");
    }

    #[test]
    fn test_match_falls_back_to_gateway() {
        let mut providers = HashMap::new();
        providers.insert("anthropic".to_string(), ProviderConfig::default());
        providers.insert("openrouter".to_string(), configured("sk-or-xyz"));

        let (_, spec) = match_provider("claude-sonnet-4-20250514", &providers).unwrap();
        assert_eq!(spec.name, "openrouter");
    }

    #[test]
    fn test_match_gateway_key_in_direct_slot() {
        let mut providers = HashMap::new();
        providers.insert("anthropic".to_string(), configured("sk-or-misplaced"));

        let (_, spec) = match_provider("claude-3-haiku", &providers).unwrap();
        assert_eq!(spec.name, "openrouter");
    }

    #[test]
    fn test_match_nothing_configured() {
        let providers = HashMap::new();
        assert!(match_provider("gpt-4o", &providers).is_none());
    }

    #[test]
    fn test_create_provider_anthropic() {
        let mut providers = HashMap::new();
        providers.insert("anthropic".to_string(), configured("sk-ant-123"));

        let provider = create_provider("claude-sonnet-4-20250514", &providers).unwrap();
        assert_eq!(provider.display_name(), "Anthropic");
        assert_eq!(provider.default_model(), "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_create_provider_openai_compat() {
        let mut providers = HashMap::new();
        providers.insert("deepseek".to_string(), configured("ds-key"));

        let provider = create_provider("deepseek-chat", &providers).unwrap();
        assert_eq!(provider.display_name(), "DeepSeek");
    }

    #[test]
    fn test_create_provider_no_config() {
        let providers = HashMap::new();
        let err = create_provider("claude-3", &providers).err().unwrap();
        assert!(matches!(err, ProviderError::NoProvider(ref m) if m == "claude-3"));
        assert!(err.to_string().contains("no configured provider"));
    }
}
