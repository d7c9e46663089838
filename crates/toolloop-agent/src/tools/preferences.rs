//! Preference tools: read and write `preferences` in the session context.

use async_trait::async_trait;
use serde_json::{json, Value};

use toolloop_core::utils::timestamp;

use super::base::{require_str, ParamType, ParameterSpec, Tool, ToolArgs};
use super::context::ToolContext;

// ─────────────────────────────────────────────
// get_user_preferences
// ─────────────────────────────────────────────

pub struct GetPreferencesTool;

#[async_trait]
impl Tool for GetPreferencesTool {
    fn name(&self) -> &str {
        "get_user_preferences"
    }

    fn description(&self) -> &str {
        "Retrieve all stored user preferences from the session state."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![]
    }

    async fn execute(&self, _args: &ToolArgs, ctx: &mut ToolContext) -> anyhow::Result<Value> {
        Ok(json!({
            "status": "success",
            "preferences": ctx.preferences(),
            "retrieved_at": timestamp(),
        }))
    }
}

// ─────────────────────────────────────────────
// update_preference
// ─────────────────────────────────────────────

pub struct UpdatePreferenceTool;

#[async_trait]
impl Tool for UpdatePreferenceTool {
    fn name(&self) -> &str {
        "update_preference"
    }

    fn description(&self) -> &str {
        "Update or add a single user preference in the session state."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required(
                "preference_key",
                ParamType::String,
                "The preference name (e.g., 'favorite_color', 'favorite_food')",
            ),
            ParameterSpec::required(
                "preference_value",
                ParamType::String,
                "The new preference value",
            ),
        ]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &mut ToolContext) -> anyhow::Result<Value> {
        let key = require_str(args, "preference_key")?;
        let value = require_str(args, "preference_value")?;

        let previous = ctx.set_preference(key, json!(value));

        Ok(json!({
            "status": "success",
            "message": format!("Updated {key} to {value}"),
            "previous_value": previous.unwrap_or_else(|| json!("not set")),
            "updated_preferences": ctx.preferences(),
            "updated_at": timestamp(),
        }))
    }
}

// ─────────────────────────────────────────────
// list_all_preferences
// ─────────────────────────────────────────────

pub struct ListPreferencesTool;

#[async_trait]
impl Tool for ListPreferencesTool {
    fn name(&self) -> &str {
        "list_all_preferences"
    }

    fn description(&self) -> &str {
        "List all stored preferences in a readable format."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![]
    }

    async fn execute(&self, _args: &ToolArgs, ctx: &mut ToolContext) -> anyhow::Result<Value> {
        let prefs = ctx.preferences();
        if prefs.is_empty() {
            return Ok(json!("No preferences stored yet."));
        }

        let lines = prefs
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("  • {k}: {s}"),
                other => format!("  • {k}: {other}"),
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(json!(format!("Your stored preferences:\n{lines}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_prefs() -> ToolContext {
        ToolContext::new("user_12345", "main_session").with_state(json!({
            "preferences": { "favorite_color": "blue", "favorite_food": "pizza" }
        }))
    }

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_get_preferences() {
        let mut ctx = ctx_with_prefs();
        let out = GetPreferencesTool.execute(&args(json!({})), &mut ctx).await.unwrap();
        assert_eq!(out["status"], "success");
        assert_eq!(out["preferences"]["favorite_food"], "pizza");
        assert!(out["retrieved_at"].is_string());
    }

    #[tokio::test]
    async fn test_update_preference_overwrites() {
        let mut ctx = ctx_with_prefs();
        let out = UpdatePreferenceTool
            .execute(
                &args(json!({"preference_key": "favorite_color", "preference_value": "green"})),
                &mut ctx,
            )
            .await
            .unwrap();

        assert_eq!(out["message"], "Updated favorite_color to green");
        assert_eq!(out["previous_value"], "blue");
        assert_eq!(out["updated_preferences"]["favorite_color"], "green");
        assert_eq!(ctx.preferences()["favorite_color"], "green");
    }

    #[tokio::test]
    async fn test_update_preference_new_key() {
        let mut ctx = ToolContext::default();
        let out = UpdatePreferenceTool
            .execute(
                &args(json!({"preference_key": "city", "preference_value": "Lisbon"})),
                &mut ctx,
            )
            .await
            .unwrap();
        assert_eq!(out["previous_value"], "not set");
        assert_eq!(ctx.preferences()["city"], "Lisbon");
    }

    #[tokio::test]
    async fn test_list_preferences() {
        let mut ctx = ctx_with_prefs();
        let out = ListPreferencesTool.execute(&args(json!({})), &mut ctx).await.unwrap();
        let text = out.as_str().unwrap();
        assert!(text.starts_with("Your stored preferences:"));
        assert!(text.contains("  • favorite_color: blue"));
    }

    #[tokio::test]
    async fn test_list_preferences_empty() {
        let mut ctx = ToolContext::default();
        let out = ListPreferencesTool.execute(&args(json!({})), &mut ctx).await.unwrap();
        assert_eq!(out, json!("No preferences stored yet."));
    }
}
