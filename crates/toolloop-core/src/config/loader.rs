//! Config loader: reads `~/.toolloop/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.toolloop/config.json`
//! 3. Environment variables `TOOLLOOP_<SECTION>__<FIELD>` (override JSON)
//! 4. Conventional provider keys (`ANTHROPIC_API_KEY`, ...) fill keys still empty

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};
use crate::utils::get_config_path;

/// Load configuration from the given path (default `~/.toolloop/config.json`) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `TOOLLOOP_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `TOOLLOOP_AGENT__MODEL` → `agent.model`
/// - `TOOLLOOP_AGENT__MAX_TOKENS` → `agent.max_tokens`
/// - `TOOLLOOP_AGENT__TEMPERATURE` → `agent.temperature`
/// - `TOOLLOOP_AGENT__MAX_ITERATIONS` → `agent.max_iterations`
/// - `TOOLLOOP_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `TOOLLOOP_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("TOOLLOOP_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Ok(val) = std::env::var("TOOLLOOP_AGENT__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.agent.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("TOOLLOOP_AGENT__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.agent.temperature = t;
        }
    }
    if let Ok(val) = std::env::var("TOOLLOOP_AGENT__MAX_ITERATIONS") {
        if let Ok(n) = val.parse::<u32>() {
            config.agent.max_iterations = n;
        }
    }

    apply_provider_env(&mut config.providers.anthropic, "ANTHROPIC");
    apply_provider_env(&mut config.providers.openai, "OPENAI");
    apply_provider_env(&mut config.providers.openrouter, "OPENROUTER");
    apply_provider_env(&mut config.providers.deepseek, "DEEPSEEK");
    apply_provider_env(&mut config.providers.gemini, "GEMINI");

    config
}

/// Apply env var overrides for a single provider.
///
/// The conventional `<NAME>_API_KEY` is only consulted when no key is set.
fn apply_provider_env(provider: &mut ProviderConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("TOOLLOOP_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("TOOLLOOP_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if provider.api_key.is_empty() {
        if let Ok(val) = std::env::var(format!("{name}_API_KEY")) {
            provider.api_key = val;
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
