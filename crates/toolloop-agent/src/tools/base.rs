//! Tool trait: the interface every agent tool implements.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use toolloop_core::types::ToolDefinition;

use super::context::ToolContext;
use crate::error::ToolError;

/// Tool arguments as sent by the model.
pub type ToolArgs = Map<String, Value>;

// ─────────────────────────────────────────────
// Parameter descriptors
// ─────────────────────────────────────────────

/// JSON Schema type of a tool parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }
}

/// One entry of a tool's parameter schema.
#[derive(Clone, Debug)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
    /// Allowed values, rendered as a JSON Schema `enum`.
    pub enum_values: Option<Vec<String>>,
}

impl ParameterSpec {
    /// A parameter the model must always supply.
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: true,
            enum_values: None,
        }
    }

    /// A parameter the model may omit.
    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    /// Restrict the parameter to a fixed set of values.
    pub fn with_enum(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

/// Render parameter specs as a JSON Schema object:
/// `{"type": "object", "properties": {...}, "required": [...]}`.
pub fn json_schema(params: &[ParameterSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for p in params {
        let mut prop = json!({
            "type": p.param_type.as_str(),
            "description": p.description,
        });
        if let Some(values) = &p.enum_values {
            prop["enum"] = json!(values);
        }
        properties.insert(p.name.clone(), prop);
        if p.required {
            required.push(Value::String(p.name.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The agent discovers tools via `name()`, sends their schemas to the model
/// via `to_definition()`, and dispatches calls via `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to call this tool (e.g. `"get_weather"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// Parameter descriptors; required ones are checked before `execute`.
    fn parameters(&self) -> Vec<ParameterSpec>;

    /// Execute the tool.
    ///
    /// `ctx` is the caller's session context; tools read and write
    /// user state through it. On failure return an `Err`: the registry
    /// converts it to an `{"error": ...}` result for the model.
    async fn execute(&self, args: &ToolArgs, ctx: &mut ToolContext) -> anyhow::Result<Value>;

    /// Build the `ToolDefinition` sent to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), json_schema(&self.parameters()))
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required string argument.
pub fn require_str<'a>(args: &'a ToolArgs, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Err(ToolError::MissingParameter(key.to_string())),
        Some(v) => v.as_str().ok_or_else(|| ToolError::InvalidArgument {
            name: key.to_string(),
            reason: format!("expected a string, got {v}"),
        }),
    }
}

/// Extract an optional string argument.
pub fn optional_str<'a>(args: &'a ToolArgs, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

/// Extract a required numeric argument. Numeric strings (`"2.5"`) are accepted.
pub fn require_f64(args: &ToolArgs, key: &str) -> Result<f64, ToolError> {
    let value = args
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?;

    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| ToolError::InvalidArgument {
            name: key.to_string(),
            reason: format!("expected a number, got {value}"),
        })
}
