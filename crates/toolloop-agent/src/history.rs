//! Conversation history: the append-only message log one agent owns.
//!
//! Entries are never mutated or removed. What gets *sent* to the model is
//! shaped by a [`WindowPolicy`]; the stored log always keeps everything.

use std::collections::HashSet;

use serde_json::Value;

use toolloop_core::types::{ContentBlock, Message, Role};

use crate::error::AgentError;

// ─────────────────────────────────────────────
// Window policies
// ─────────────────────────────────────────────

/// Chooses which suffix of the history is sent with each model call.
pub trait WindowPolicy: Send + Sync + std::fmt::Debug {
    fn window<'a>(&self, messages: &'a [Message]) -> &'a [Message];
}

/// Send the whole history.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl WindowPolicy for Unbounded {
    fn window<'a>(&self, messages: &'a [Message]) -> &'a [Message] {
        messages
    }
}

/// Send only the last `n` user turns.
///
/// A turn starts at a user text message, so a cut never separates a
/// `tool_use` block from its `tool_result`. `LastTurns(0)` behaves like
/// `LastTurns(1)`: the current turn is always sent.
#[derive(Clone, Copy, Debug)]
pub struct LastTurns(pub usize);

impl WindowPolicy for LastTurns {
    fn window<'a>(&self, messages: &'a [Message]) -> &'a [Message] {
        let wanted = self.0.max(1);
        let start = messages
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, m)| m.is_user_text())
            .nth(wanted - 1)
            .map_or(0, |(i, _)| i);
        &messages[start..]
    }
}

// ─────────────────────────────────────────────
// ConversationHistory
// ─────────────────────────────────────────────

#[derive(Debug)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    policy: Box<dyn WindowPolicy>,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationHistory {
    /// Empty history that sends everything.
    pub fn new() -> Self {
        Self::with_policy(Unbounded)
    }

    pub fn with_policy(policy: impl WindowPolicy + 'static) -> Self {
        Self {
            messages: Vec::new(),
            policy: Box::new(policy),
        }
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    pub fn append_assistant(&mut self, blocks: Vec<ContentBlock>) {
        self.messages.push(Message::assistant_blocks(blocks));
    }

    /// Append one batch of tool results as a single user message.
    ///
    /// The batch must answer exactly the tool calls of the last message,
    /// which must be an assistant message: every requested id once, no
    /// unknown ids. Otherwise nothing is appended.
    pub fn append_tool_results(&mut self, results: Vec<ContentBlock>) -> Result<(), AgentError> {
        let pending: HashSet<String> = match self.messages.last() {
            Some(last) if last.role == Role::Assistant && !last.tool_uses().is_empty() => {
                last.tool_uses().into_iter().map(|u| u.id).collect()
            }
            _ => {
                return Err(AgentError::ToolResultMismatch(
                    "no assistant message awaiting tool results".into(),
                ))
            }
        };

        let mut answered = HashSet::new();
        for block in &results {
            let ContentBlock::ToolResult { tool_use_id, .. } = block else {
                return Err(AgentError::ToolResultMismatch(
                    "batch contains a non tool_result block".into(),
                ));
            };
            if !pending.contains(tool_use_id) {
                return Err(AgentError::ToolResultMismatch(format!(
                    "unexpected tool_use_id '{tool_use_id}'"
                )));
            }
            if !answered.insert(tool_use_id.as_str()) {
                return Err(AgentError::ToolResultMismatch(format!(
                    "duplicate result for '{tool_use_id}'"
                )));
            }
        }

        if let Some(missing) = pending.iter().find(|id| !answered.contains(id.as_str())) {
            return Err(AgentError::ToolResultMismatch(format!(
                "no result for '{missing}'"
            )));
        }

        self.messages.push(Message::tool_results(results));
        Ok(())
    }

    /// The messages to send with the next model call.
    pub fn as_request_payload(&self) -> &[Message] {
        self.policy.window(&self.messages)
    }

    /// Full stored history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Tool calls recorded from message index `from` onwards, each paired
    /// with its result.
    pub fn tool_trace(&self, from: usize) -> Vec<ToolTrace> {
        let tail = self.messages.get(from..).unwrap_or_default();
        let mut traces = Vec::new();

        for (i, msg) in tail.iter().enumerate() {
            if msg.role != Role::Assistant {
                continue;
            }
            let results = tail.get(i + 1).map(Message::blocks).unwrap_or_default();
            for call in msg.tool_uses() {
                let result = results.iter().find_map(|b| match b {
                    ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                    } if *tool_use_id == call.id => Some((content.clone(), is_error.unwrap_or(false))),
                    _ => None,
                });
                let (output, is_error) = result.unwrap_or_default();
                traces.push(ToolTrace {
                    name: call.name,
                    input: call.input,
                    output,
                    is_error,
                });
            }
        }
        traces
    }
}

/// One executed tool call, for display.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolTrace {
    pub name: String,
    pub input: Value,
    pub output: String,
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool_round(history: &mut ConversationHistory, id: &str) {
        history.append_assistant(vec![ContentBlock::tool_use(id, "get_weather", json!({"city": "Tokyo"}))]);
        history
            .append_tool_results(vec![ContentBlock::tool_result(id, "{}", false)])
            .unwrap();
    }

    #[test]
    fn test_appends_in_order() {
        let mut h = ConversationHistory::new();
        h.append_user("Hi");
        h.append_assistant(vec![ContentBlock::text("Hello!")]);
        assert_eq!(h.len(), 2);
        assert_eq!(h.messages()[0], Message::user("Hi"));
        assert_eq!(h.last().unwrap().text(), "Hello!");
    }

    #[test]
    fn test_tool_results_must_match_pending_calls() {
        let mut h = ConversationHistory::new();
        h.append_user("Weather in Tokyo and Paris?");
        h.append_assistant(vec![
            ContentBlock::tool_use("a", "get_weather", json!({"city": "Tokyo"})),
            ContentBlock::tool_use("b", "get_weather", json!({"city": "Paris"})),
        ]);

        // Missing one
        let err = h
            .append_tool_results(vec![ContentBlock::tool_result("a", "{}", false)])
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolResultMismatch(_)));

        // Unknown id
        assert!(h
            .append_tool_results(vec![
                ContentBlock::tool_result("a", "{}", false),
                ContentBlock::tool_result("zzz", "{}", false),
            ])
            .is_err());

        // Duplicate id
        assert!(h
            .append_tool_results(vec![
                ContentBlock::tool_result("a", "{}", false),
                ContentBlock::tool_result("a", "{}", false),
            ])
            .is_err());

        assert_eq!(h.len(), 2, "failed appends must not change the history");

        h.append_tool_results(vec![
            ContentBlock::tool_result("b", "{}", false),
            ContentBlock::tool_result("a", "{}", false),
        ])
        .unwrap();
        assert_eq!(h.len(), 3);

        // Already answered
        assert!(h
            .append_tool_results(vec![ContentBlock::tool_result("a", "{}", false)])
            .is_err());
    }

    #[test]
    fn test_tool_results_without_assistant() {
        let mut h = ConversationHistory::new();
        h.append_user("Hi");
        assert!(h.append_tool_results(vec![]).is_err());
    }

    #[test]
    fn test_unbounded_sends_everything() {
        let mut h = ConversationHistory::new();
        for i in 0..5 {
            h.append_user(format!("q{i}"));
            h.append_assistant(vec![ContentBlock::text(format!("a{i}"))]);
        }
        assert_eq!(h.as_request_payload().len(), 10);
    }

    #[test]
    fn test_last_turns_keeps_tool_pairs_together() {
        let mut h = ConversationHistory::with_policy(LastTurns(2));
        h.append_user("first");
        h.append_assistant(vec![ContentBlock::text("ok")]);
        h.append_user("second");
        tool_round(&mut h, "t1");
        h.append_assistant(vec![ContentBlock::text("done")]);
        h.append_user("third");

        let window = h.as_request_payload();
        assert_eq!(window[0], Message::user("second"));
        assert_eq!(window.len(), 5);
        assert_eq!(h.len(), 7, "windowing never truncates storage");
    }

    #[test]
    fn test_last_turns_zero_acts_like_one() {
        let mut h = ConversationHistory::with_policy(LastTurns(0));
        h.append_user("old");
        h.append_assistant(vec![ContentBlock::text("reply")]);
        h.append_user("new");
        assert_eq!(h.as_request_payload(), &[Message::user("new")]);
    }

    #[test]
    fn test_last_turns_more_than_available() {
        let mut h = ConversationHistory::with_policy(LastTurns(10));
        h.append_user("only");
        assert_eq!(h.as_request_payload().len(), 1);
    }

    #[test]
    fn test_tool_trace() {
        let mut h = ConversationHistory::new();
        h.append_user("old");
        h.append_assistant(vec![ContentBlock::text("reply")]);
        let mark = h.len();

        h.append_user("Weather?");
        h.append_assistant(vec![ContentBlock::tool_use("x", "lookup", json!({"q": 1}))]);
        h.append_tool_results(vec![ContentBlock::tool_result("x", r#"{"error":"boom"}"#, true)])
            .unwrap();
        h.append_assistant(vec![ContentBlock::text("Sorry.")]);

        let trace = h.tool_trace(mark);
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].name, "lookup");
        assert_eq!(trace[0].input, json!({"q": 1}));
        assert!(trace[0].is_error);

        assert!(h.tool_trace(h.len() + 5).is_empty());
    }
}
