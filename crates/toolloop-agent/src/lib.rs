//! toolloop agent: the model ↔ tool-calling loop and everything it drives.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, per-call context and built-in tools
//! - **history**: append-only conversation history + window policies
//! - **context**: system prompt construction
//! - **agent_loop**: the state machine alternating model calls and tool runs

pub mod agent_loop;
pub mod context;
pub mod error;
pub mod history;
pub mod tools;

pub use agent_loop::{Agent, AgentOptions, RunOutcome, MAX_ITERATIONS_MESSAGE};
pub use context::{ContextBuilder, DEFAULT_SYSTEM_PROMPT, WEATHER_SYSTEM_PROMPT};
pub use error::{AgentError, ToolError};
pub use history::{ConversationHistory, LastTurns, ToolTrace, Unbounded, WindowPolicy};
pub use tools::{builtin_tools, weather_tools, Tool, ToolContext, ToolOutput, ToolRegistry};
