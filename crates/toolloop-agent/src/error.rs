//! Error taxonomy for the agent loop and its tools.

use thiserror::Error;
use toolloop_providers::ProviderError;

/// Errors surfaced by the registry, the history and the loop.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Two tools share a name. Raised at registration, before any model call.
    #[error("duplicate tool name: '{0}'")]
    DuplicateToolName(String),

    /// The model asked for a tool that is not registered.
    #[error("unknown tool: '{0}'")]
    UnknownTool(String),

    /// Tool results do not pair one-to-one with the pending tool requests.
    #[error("tool results do not match pending tool calls: {0}")]
    ToolResultMismatch(String),

    /// The model call failed. Never retried.
    #[error("model call failed: {0}")]
    Model(#[from] ProviderError),
}

/// Argument problems a tool reports while executing.
///
/// Returned through `anyhow` from [`crate::Tool::execute`]; the registry turns
/// them into `{"error": ...}` results like any other tool failure.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("Arguments must be a JSON object")]
    ArgumentsNotObject,
}
