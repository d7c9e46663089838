//! Agent loop: alternates model calls and tool executions until the model
//! answers in plain text or the iteration cap is hit.
//!
//! ```text
//!              ┌──────────── tools ran, iterations += 1 ─────────────┐
//!              ▼                                                     │
//!   user ─▶ AWAIT_MODEL ── tool_use blocks ──▶ HAS_TOOL_CALLS ───────┘
//!              │
//!              └── text only ──▶ DONE
//!
//!   (any state, iterations >= max) ──▶ MAX_ITER_REACHED
//! ```
//!
//! Everything is sequential: one model call or one tool call in flight at a
//! time, tool calls run in the order the model emitted them.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use toolloop_core::config::AgentDefaults;
use toolloop_core::types::{ContentBlock, ToolUse};
use toolloop_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::context::{ContextBuilder, DEFAULT_SYSTEM_PROMPT};
use crate::error::AgentError;
use crate::history::{ConversationHistory, LastTurns};
use crate::tools::{Tool, ToolContext, ToolOutput, ToolRegistry};

/// Returned instead of an answer when the iteration cap stops a run.
pub const MAX_ITERATIONS_MESSAGE: &str = "Maximum iterations reached without completion.";

/// Default maximum tool rounds per user message.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

// ─────────────────────────────────────────────
// Options / outcome
// ─────────────────────────────────────────────

/// Construction options for an [`Agent`].
#[derive(Clone, Debug)]
pub struct AgentOptions {
    /// Model to call; `None` uses the provider's default model.
    pub model: Option<String>,
    /// Tool rounds allowed per run; at most this many model calls happen.
    pub max_iterations: u32,
    pub request_config: LlmRequestConfig,
    pub context: ContextBuilder,
    /// Send only the last N user turns (`None` sends everything).
    pub history_turns: Option<usize>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            model: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            request_config: LlmRequestConfig::default(),
            context: ContextBuilder::default(),
            history_turns: None,
        }
    }
}

impl AgentOptions {
    /// Options from the `agent` section of the config file.
    pub fn from_config(agent: &AgentDefaults) -> Self {
        let instructions = agent
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Self {
            model: Some(agent.model.clone()),
            max_iterations: agent.max_iterations,
            request_config: LlmRequestConfig {
                max_tokens: agent.max_tokens,
                temperature: agent.temperature,
            },
            context: ContextBuilder::new(instructions)
                .with_datetime(agent.inject_datetime)
                .with_session_state(agent.inject_session_state),
            history_turns: agent.history_turns,
        }
    }
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// The model produced a final answer.
    Done { answer: String, iterations: u32 },
    /// The iteration cap stopped the run. Not an error.
    MaxIterationsReached { iterations: u32 },
}

impl RunOutcome {
    /// The answer, or [`MAX_ITERATIONS_MESSAGE`].
    pub fn text(&self) -> &str {
        match self {
            RunOutcome::Done { answer, .. } => answer,
            RunOutcome::MaxIterationsReached { .. } => MAX_ITERATIONS_MESSAGE,
        }
    }

    pub fn iterations(&self) -> u32 {
        match self {
            RunOutcome::Done { iterations, .. } | RunOutcome::MaxIterationsReached { iterations } => {
                *iterations
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, RunOutcome::Done { .. })
    }
}

/// Per-run loop state. Lives only inside [`Agent::run`].
enum LoopState {
    AwaitModel,
    HasToolCalls(Vec<ToolUse>),
    Done(String),
    MaxIterReached,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// A tool-calling agent with its own conversation history.
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    history: ConversationHistory,
    model: String,
    max_iterations: u32,
    request_config: LlmRequestConfig,
    context: ContextBuilder,
    history_turns: Option<usize>,
}

impl Agent {
    /// Create an agent. Fails if two tools share a name.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Vec<Arc<dyn Tool>>,
        options: AgentOptions,
    ) -> Result<Self, AgentError> {
        let tools = ToolRegistry::from_tools(tools)?;
        let model = options
            .model
            .unwrap_or_else(|| provider.default_model().to_string());

        info!(
            model = %model,
            provider = provider.display_name(),
            tools = tools.len(),
            max_iterations = options.max_iterations,
            "agent initialized"
        );

        Ok(Self {
            provider,
            tools,
            history: new_history(options.history_turns),
            model,
            max_iterations: options.max_iterations,
            request_config: options.request_config,
            context: options.context,
            history_turns: options.history_turns,
        })
    }

    /// Process one user message to completion.
    ///
    /// Tool failures are fed back to the model and never abort the run. A
    /// failed model call aborts it with [`AgentError::Model`]; whatever was
    /// appended to the history before the failure stays there. A response
    /// whose tool call ids are empty or repeated aborts the run with
    /// [`AgentError::ToolResultMismatch`] before any tool runs, and is not
    /// stored.
    pub async fn run(
        &mut self,
        text: &str,
        ctx: &mut ToolContext,
    ) -> Result<RunOutcome, AgentError> {
        info!(
            user_id = %ctx.user_id,
            session_id = %ctx.session_id,
            history = self.history.len(),
            "run started"
        );

        self.history.append_user(text);
        let definitions = self.tools.definitions();
        let mut iterations = 0;
        let mut state = LoopState::AwaitModel;

        loop {
            if iterations >= self.max_iterations
                && matches!(state, LoopState::AwaitModel | LoopState::HasToolCalls(_))
            {
                state = LoopState::MaxIterReached;
            }

            state = match state {
                LoopState::AwaitModel => {
                    let system = self.context.build_system_prompt(ctx);
                    debug!(
                        iteration = iterations,
                        messages = self.history.as_request_payload().len(),
                        "calling model"
                    );

                    let response = self
                        .provider
                        .chat(
                            Some(system.as_str()),
                            self.history.as_request_payload(),
                            &definitions,
                            &self.model,
                            &self.request_config,
                        )
                        .await?;

                    if let Some(usage) = &response.usage {
                        debug!(
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "model usage"
                        );
                    }

                    let calls = response.tool_uses();
                    check_call_ids(&calls)?;
                    let answer = response.text_content();
                    if response.content.is_empty() {
                        warn!("model returned no content blocks, not stored");
                    } else {
                        self.history.append_assistant(response.content);
                    }

                    if calls.is_empty() {
                        LoopState::Done(answer)
                    } else {
                        LoopState::HasToolCalls(calls)
                    }
                }

                LoopState::HasToolCalls(calls) => {
                    let results = self.execute_tool_calls(&calls, ctx).await;
                    self.history.append_tool_results(results)?;
                    iterations += 1;
                    LoopState::AwaitModel
                }

                LoopState::Done(answer) => {
                    info!(iterations, answer_len = answer.len(), "run finished");
                    return Ok(RunOutcome::Done { answer, iterations });
                }

                LoopState::MaxIterReached => {
                    warn!(iterations, max = self.max_iterations, "iteration cap reached");
                    return Ok(RunOutcome::MaxIterationsReached { iterations });
                }
            };
        }
    }

    /// Run each requested tool in order, producing one result block per call.
    async fn execute_tool_calls(
        &self,
        calls: &[ToolUse],
        ctx: &mut ToolContext,
    ) -> Vec<ContentBlock> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            info!(tool = %call.name, id = %call.id, "executing tool call");

            let output = match self.tools.invoke(&call.name, &call.input, ctx).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "tool call rejected");
                    ToolOutput::error(capitalize(&e.to_string()))
                }
            };

            debug!(
                tool = %call.name,
                is_error = output.is_error,
                "tool result"
            );
            results.push(ContentBlock::tool_result(
                &call.id,
                output.to_content(),
                output.is_error,
            ));
        }
        results
    }

    /// Start a new conversation. Tools and options are kept.
    pub fn reset(&mut self) {
        info!("conversation reset");
        self.history = new_history(self.history_turns);
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}

/// Reject a batch of tool calls whose ids could not be paired with results:
/// every id must be non-empty and unique. Checked before any tool runs and
/// before the assistant turn is stored, so a rejected turn leaves neither
/// side effects nor an unanswered `tool_use` in the history.
fn check_call_ids(calls: &[ToolUse]) -> Result<(), AgentError> {
    let mut seen = HashSet::new();
    for call in calls {
        if call.id.is_empty() {
            return Err(AgentError::ToolResultMismatch(format!(
                "tool call '{}' has an empty id",
                call.name
            )));
        }
        if !seen.insert(call.id.as_str()) {
            return Err(AgentError::ToolResultMismatch(format!(
                "duplicate tool call id '{}'",
                call.id
            )));
        }
    }
    Ok(())
}

fn new_history(history_turns: Option<usize>) -> ConversationHistory {
    match history_turns {
        Some(n) => ConversationHistory::with_policy(LastTurns(n)),
        None => ConversationHistory::new(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
