//! Per-session context handed to every tool call.
//!
//! The caller owns the context and passes it into [`crate::Agent::run`] as
//! `&mut`; the loop lends it to each tool in turn. Nothing is injected
//! behind the tool's back.

use serde_json::{Map, Value};
use tracing::warn;

/// State key under which user preferences are stored.
pub const PREFERENCES_KEY: &str = "preferences";

/// Identity plus mutable key/value state for one conversation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolContext {
    pub user_id: String,
    pub session_id: String,
    pub state: Map<String, Value>,
}

impl ToolContext {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            state: Map::new(),
        }
    }

    /// Seed the state from a JSON object. Anything else is ignored.
    pub fn with_state(mut self, state: Value) -> Self {
        match state {
            Value::Object(map) => self.state = map,
            Value::Null => {}
            other => warn!(state = %other, "initial state is not a JSON object, ignoring"),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Insert or overwrite a state entry, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.state.insert(key.into(), value)
    }

    /// Current preferences (empty when none are stored).
    pub fn preferences(&self) -> Map<String, Value> {
        match self.state.get(PREFERENCES_KEY) {
            Some(Value::Object(prefs)) => prefs.clone(),
            _ => Map::new(),
        }
    }

    /// Insert or overwrite one preference, returning the previous value.
    pub fn set_preference(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let entry = self
            .state
            .entry(PREFERENCES_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(prefs) => prefs.insert(key.into(), value),
            _ => None,
        }
    }
}
