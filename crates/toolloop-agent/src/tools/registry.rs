//! Tool Registry: ordered store of tools, dispatching calls by name.
//!
//! The agent sends `definitions()` to the model and routes each tool-use
//! request through `invoke()`. Tool failures never escape `invoke`; they
//! come back as `{"error": ...}` outputs for the model to read.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use toolloop_core::types::ToolDefinition;

use super::base::Tool;
use super::context::ToolContext;
use crate::error::{AgentError, ToolError};

// ─────────────────────────────────────────────
// ToolOutput
// ─────────────────────────────────────────────

/// What a tool call produced, as fed back to the model.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolOutput {
    pub value: Value,
    /// Set when the tool failed; `value` is then `{"error": message}`.
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(value: Value) -> Self {
        Self {
            value,
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            value: json!({ "error": message.into() }),
            is_error: true,
        }
    }

    /// Serialized form for a `tool_result` block: strings are sent raw,
    /// anything else as compact JSON.
    pub fn to_content(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools in registration order and dispatches calls.
///
/// Owns `Arc<dyn Tool>` so tool sets can be shared between agents.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a batch of tools.
    ///
    /// Atomic: if any two tools share a name, no registry is produced.
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Result<Self, AgentError> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register one tool. A duplicate name is rejected and the registry is
    /// left unchanged.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), AgentError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(AgentError::DuplicateToolName(name));
        }
        info!(tool = %name, "registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names of all registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Model-facing definitions, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool by name.
    ///
    /// Returns `Err(UnknownTool)` only when no tool has that name. Missing
    /// required arguments and execution failures become error outputs.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: &Value,
        ctx: &mut ToolContext,
    ) -> Result<ToolOutput, AgentError> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;

        let args = match arguments {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => return Ok(failure(name, ToolError::ArgumentsNotObject)),
        };

        if let Some(missing) = tool
            .parameters()
            .into_iter()
            .find(|p| p.required && args.get(&p.name).map_or(true, Value::is_null))
        {
            return Ok(failure(name, ToolError::MissingParameter(missing.name)));
        }

        match tool.execute(&args, ctx).await {
            Ok(value) => {
                debug!(tool = name, "tool succeeded");
                Ok(ToolOutput::success(value))
            }
            Err(e) => Ok(failure(name, e)),
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn failure(name: &str, error: impl std::fmt::Display) -> ToolOutput {
    warn!(tool = name, error = %error, "tool execution failed");
    ToolOutput::error(format!("Tool execution failed: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base::{require_str, ParamType, ParameterSpec, ToolArgs};
    use async_trait::async_trait;

    /// Minimal test tool.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> Vec<ParameterSpec> {
            vec![ParameterSpec::required("text", ParamType::String, "Text to echo")]
        }
        async fn execute(&self, args: &ToolArgs, _ctx: &mut ToolContext) -> anyhow::Result<Value> {
            Ok(json!(format!("Echo: {}", require_str(args, "text")?)))
        }
    }

    /// Tool that always fails.
    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn name(&self) -> &str {
            "fail"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> Vec<ParameterSpec> {
            vec![]
        }
        async fn execute(&self, _args: &ToolArgs, _ctx: &mut ToolContext) -> anyhow::Result<Value> {
            anyhow::bail!("intentional failure")
        }
    }

    /// Tool that writes into the context.
    struct CounterTool;

    #[async_trait]
    impl Tool for CounterTool {
        fn name(&self) -> &str {
            "count"
        }
        fn description(&self) -> &str {
            "Increments a counter in session state"
        }
        fn parameters(&self) -> Vec<ParameterSpec> {
            vec![]
        }
        async fn execute(&self, _args: &ToolArgs, ctx: &mut ToolContext) -> anyhow::Result<Value> {
            let n = ctx.get("count").and_then(Value::as_u64).unwrap_or(0) + 1;
            ctx.set("count", json!(n));
            Ok(json!({ "count": n }))
        }
    }

    fn ctx() -> ToolContext {
        ToolContext::new("user", "session")
    }

    #[test]
    fn test_register_and_lookup() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool)).unwrap();
        assert!(reg.has("echo"));
        assert!(!reg.has("nope"));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("echo").unwrap().description(), "Echoes back the input");
    }

    #[test]
    fn test_registration_order_preserved() {
        let reg = ToolRegistry::from_tools(vec![
            Arc::new(FailTool),
            Arc::new(EchoTool),
            Arc::new(CounterTool),
        ])
        .unwrap();
        assert_eq!(reg.tool_names(), vec!["fail", "echo", "count"]);

        let defs = reg.definitions();
        assert_eq!(defs[1].name, "echo");
        assert_eq!(defs[1].input_schema["required"], json!(["text"]));
    }

    #[test]
    fn test_duplicate_batch_produces_no_registry() {
        let result = ToolRegistry::from_tools(vec![
            Arc::new(EchoTool),
            Arc::new(FailTool),
            Arc::new(EchoTool),
        ]);
        assert!(matches!(result, Err(AgentError::DuplicateToolName(ref n)) if n == "echo"));
    }

    #[test]
    fn test_duplicate_single_leaves_registry_unchanged() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool)).unwrap();
        let err = reg.register(Arc::new(EchoTool)).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateToolName(_)));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.tool_names(), vec!["echo"]);
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let reg = ToolRegistry::from_tools(vec![Arc::new(EchoTool)]).unwrap();
        let out = reg
            .invoke("echo", &json!({"text": "hello"}), &mut ctx())
            .await
            .unwrap();
        assert!(!out.is_error);
        assert_eq!(out.to_content(), "Echo: hello");
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let reg = ToolRegistry::new();
        let err = reg.invoke("nope", &json!({}), &mut ctx()).await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool(ref n) if n == "nope"));
    }

    #[tokio::test]
    async fn test_invoke_failure_becomes_error_value() {
        let reg = ToolRegistry::from_tools(vec![Arc::new(FailTool)]).unwrap();
        let out = reg.invoke("fail", &json!({}), &mut ctx()).await.unwrap();
        assert!(out.is_error);
        assert_eq!(
            out.value,
            json!({"error": "Tool execution failed: intentional failure"})
        );
        assert_eq!(
            out.to_content(),
            r#"{"error":"Tool execution failed: intentional failure"}"#
        );
    }

    #[tokio::test]
    async fn test_invoke_missing_required_param() {
        let reg = ToolRegistry::from_tools(vec![Arc::new(EchoTool)]).unwrap();
        let out = reg.invoke("echo", &json!({}), &mut ctx()).await.unwrap();
        assert!(out.is_error);
        assert!(out.value["error"]
            .as_str()
            .unwrap()
            .contains("Missing required parameter: text"));
    }

    #[tokio::test]
    async fn test_invoke_non_object_arguments() {
        let reg = ToolRegistry::from_tools(vec![Arc::new(FailTool)]).unwrap();
        let out = reg.invoke("fail", &json!([1, 2]), &mut ctx()).await.unwrap();
        assert!(out.is_error);
    }

    #[tokio::test]
    async fn test_invoke_mutates_context() {
        let reg = ToolRegistry::from_tools(vec![Arc::new(CounterTool)]).unwrap();
        let mut c = ctx();
        reg.invoke("count", &Value::Null, &mut c).await.unwrap();
        let out = reg.invoke("count", &json!({}), &mut c).await.unwrap();
        assert_eq!(out.value, json!({"count": 2}));
        assert_eq!(c.get("count"), Some(&json!(2)));
    }
}
