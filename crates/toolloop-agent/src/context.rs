//! Context builder: constructs the system prompt sent with each model call.
//!
//! The prompt is the base instructions, optionally followed by the current
//! date/time and a snapshot of the session state.

use chrono::Local;
use serde_json::Value;

use crate::tools::ToolContext;

/// General problem-solving instructions.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful AI assistant that solves problems systematically.

When faced with complex questions, break them down into smaller steps.
Use available tools when you need to retrieve information or perform actions.
Think through problems logically and explain your reasoning.
Always verify your answers before presenting them to the user.";

/// Instructions for the weather assistant.
pub const WEATHER_SYSTEM_PROMPT: &str = "\
You are a helpful weather assistant.

When users ask about weather, use the get_weather tool to retrieve accurate information.
Present weather data in a clear, conversational manner.
If users don't specify a temperature unit, use celsius by default.
Always mention the weather condition along with the temperature.";

// ─────────────────────────────────────────────
// Context builder
// ─────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct ContextBuilder {
    instructions: String,
    inject_datetime: bool,
    inject_session_state: bool,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl ContextBuilder {
    /// Builder with the given base instructions and no injected sections.
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            inject_datetime: false,
            inject_session_state: false,
        }
    }

    pub fn with_datetime(mut self, enabled: bool) -> Self {
        self.inject_datetime = enabled;
        self
    }

    pub fn with_session_state(mut self, enabled: bool) -> Self {
        self.inject_session_state = enabled;
        self
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Build the full system prompt for the current state of `ctx`.
    pub fn build_system_prompt(&self, ctx: &ToolContext) -> String {
        let mut parts = vec![self.instructions.clone()];

        if self.inject_datetime {
            let now = Local::now().format("%Y-%m-%d %H:%M:%S (%A)");
            parts.push(format!("## Current Date and Time\n\n{now}"));
        }

        if self.inject_session_state {
            if let Some(state) = render_state(ctx) {
                parts.push(format!("## Session State\n\n{state}"));
            }
        }

        parts.join("\n\n")
    }
}

/// One `- key: value` line per public state entry. Keys starting with `_`
/// are internal and skipped.
fn render_state(ctx: &ToolContext) -> Option<String> {
    let lines = ctx
        .state
        .iter()
        .filter(|(k, _)| !k.starts_with('_'))
        .map(|(k, v)| match v {
            Value::String(s) => format!("- {k}: {s}"),
            other => format!("- {k}: {other}"),
        })
        .collect::<Vec<_>>();

    (!lines.is_empty()).then(|| lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> ToolContext {
        ToolContext::new("user_12345", "main_session").with_state(json!({
            "preferences": {"favorite_color": "blue"},
            "mood": "curious",
            "_internal": "hidden"
        }))
    }

    #[test]
    fn test_plain_instructions() {
        let prompt = ContextBuilder::new("Be brief.").build_system_prompt(&ctx());
        assert_eq!(prompt, "Be brief.");
    }

    #[test]
    fn test_default_prompt() {
        let prompt = ContextBuilder::default().build_system_prompt(&ToolContext::default());
        assert!(prompt.starts_with("You are a helpful AI assistant"));
    }

    #[test]
    fn test_session_state_section() {
        let prompt = ContextBuilder::new("Base.")
            .with_session_state(true)
            .build_system_prompt(&ctx());

        assert!(prompt.contains("## Session State"));
        assert!(prompt.contains(r#"- preferences: {"favorite_color":"blue"}"#));
        assert!(prompt.contains("- mood: curious"));
        assert!(!prompt.contains("_internal"));
    }

    #[test]
    fn test_empty_state_adds_no_section() {
        let prompt = ContextBuilder::new("Base.")
            .with_session_state(true)
            .build_system_prompt(&ToolContext::default());
        assert_eq!(prompt, "Base.");
    }

    #[test]
    fn test_datetime_section() {
        let prompt = ContextBuilder::new("Base.")
            .with_datetime(true)
            .build_system_prompt(&ToolContext::default());
        assert!(prompt.starts_with("Base.\n\n## Current Date and Time\n\n"));
    }
}
