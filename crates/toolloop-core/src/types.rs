//! Core types for toolloop: conversation messages, content blocks, and tool schemas.
//!
//! The message model is block-based: a message is either plain text or an
//! ordered list of typed blocks (text, tool-use request, tool result). This is
//! the shape the Anthropic Messages API uses natively; the OpenAI-compatible
//! provider translates to and from it at the HTTP boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// Who authored a message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    /// Create a user message with plain text content.
    pub fn user(text: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Create an assistant message with plain text content.
    pub fn assistant(text: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Create an assistant message from the blocks a model returned.
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Message {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Create the user-role message that carries a batch of tool results.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Message {
            role: Role::User,
            content: MessageContent::Blocks(results),
        }
    }

    /// Content blocks of this message (empty for plain text).
    pub fn blocks(&self) -> &[ContentBlock] {
        match &self.content {
            MessageContent::Text(_) => &[],
            MessageContent::Blocks(blocks) => blocks,
        }
    }

    /// Tool-use requests contained in this message, in order.
    pub fn tool_uses(&self) -> Vec<ToolUse> {
        self.blocks().iter().filter_map(ContentBlock::as_tool_use).collect()
    }

    /// Whether this is a user message typed by a human (not a tool-result batch).
    ///
    /// These mark turn boundaries in the history.
    pub fn is_user_text(&self) -> bool {
        if self.role != Role::User {
            return false;
        }
        match &self.content {
            MessageContent::Text(_) => true,
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .all(|b| matches!(b, ContentBlock::Text { .. })),
        }
    }

    /// All text in this message, text blocks joined with `\n`.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => join_text(blocks),
        }
    }
}

/// Message content: plain text or a sequence of typed blocks.
///
/// When serialized: text becomes a plain string, blocks become an array of objects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A typed element of message content.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Plain text.
    #[serde(rename = "text")]
    Text { text: String },

    /// The model asks the caller to run a tool.
    #[serde(rename = "tool_use")]
    ToolUse {
        /// Call id, echoed back in the matching result.
        id: String,
        name: String,
        input: Value,
    },

    /// Output of a tool run, correlated to its request by `tool_use_id`.
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        /// Serialized tool output.
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },

    /// Any block type this crate does not model (e.g. `thinking`).
    /// Providers drop these before a response reaches the agent.
    #[serde(other, skip_serializing)]
    Unsupported,
}

impl ContentBlock {
    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// Create a tool-use block.
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Create a tool-result block. `is_error` is only serialized when set.
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: is_error.then_some(true),
        }
    }

    /// View this block as a tool-use request, if it is one.
    pub fn as_tool_use(&self) -> Option<ToolUse> {
        match self {
            ContentBlock::ToolUse { id, name, input } => Some(ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            _ => None,
        }
    }
}

/// Concatenate the text blocks of a block list with `\n`.
pub fn join_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────
// Tool calls and definitions
// ─────────────────────────────────────────────

/// An owned tool-use request extracted from a model response.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// Definition of a tool, sent to the model so it knows what it may call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the tool's arguments.
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        ToolDefinition {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

// ─────────────────────────────────────────────
// Model response
// ─────────────────────────────────────────────

/// What a provider returns for one model call, normalized to blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelResponse {
    /// Ordered content blocks: text and/or tool-use requests.
    pub content: Vec<ContentBlock>,
    /// Why the model stopped (`end_turn`, `tool_use`, `max_tokens`, ...).
    pub stop_reason: Option<String>,
    /// Token accounting, when the provider reports it.
    pub usage: Option<UsageInfo>,
}

impl ModelResponse {
    /// A response consisting of a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        ModelResponse {
            content: vec![ContentBlock::text(text)],
            stop_reason: Some("end_turn".into()),
            usage: None,
        }
    }

    /// Whether the response requests at least one tool call.
    pub fn has_tool_calls(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// Tool-use requests in the order the model emitted them.
    pub fn tool_uses(&self) -> Vec<ToolUse> {
        self.content.iter().filter_map(ContentBlock::as_tool_use).collect()
    }

    /// Text blocks joined with `\n`.
    pub fn text_content(&self) -> String {
        join_text(&self.content)
    }
}

/// Token usage statistics.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_text_serialization() {
        let msg = Message::user("What's the weather in Tokyo?");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "What's the weather in Tokyo?");
    }

    #[test]
    fn test_assistant_blocks_serialization() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::text("Let me check."),
            ContentBlock::tool_use("toolu_1", "get_weather", json!({"city": "Tokyo"})),
        ]);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "assistant");
        let content = json["content"].as_array().unwrap();
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[1]["type"], "tool_use");
        assert_eq!(content[1]["id"], "toolu_1");
        assert_eq!(content[1]["input"]["city"], "Tokyo");
    }

    #[test]
    fn test_tool_result_omits_is_error_when_ok() {
        let block = ContentBlock::tool_result("toolu_1", "{\"temperature\":28}", false);
        let json = serde_json::to_value(&block).unwrap();

        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["tool_use_id"], "toolu_1");
        assert!(json.get("is_error").is_none());

        let failed = ContentBlock::tool_result("toolu_2", "{\"error\":\"boom\"}", true);
        assert_eq!(serde_json::to_value(&failed).unwrap()["is_error"], true);
    }

    #[test]
    fn test_unknown_block_type_deserializes_as_unsupported() {
        let block: ContentBlock =
            serde_json::from_value(json!({"type": "thinking", "thinking": "hmm"})).unwrap();
        assert_eq!(block, ContentBlock::Unsupported);
    }

    #[test]
    fn test_message_tool_uses_in_order() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::tool_use("a", "add", json!({"a": 1, "b": 2})),
            ContentBlock::text("and"),
            ContentBlock::tool_use("b", "multiply", json!({"a": 3, "b": 4})),
        ]);
        let ids: Vec<String> = msg.tool_uses().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_is_user_text() {
        assert!(Message::user("hi").is_user_text());
        assert!(!Message::assistant("hi").is_user_text());
        let results = Message::tool_results(vec![ContentBlock::tool_result("a", "1", false)]);
        assert!(!results.is_user_text());
    }

    #[test]
    fn test_response_text_joins_blocks() {
        let resp = ModelResponse {
            content: vec![
                ContentBlock::text("Tokyo is sunny."),
                ContentBlock::text("It's 28°C."),
            ],
            ..Default::default()
        };
        assert!(!resp.has_tool_calls());
        assert_eq!(resp.text_content(), "Tokyo is sunny.\nIt's 28°C.");
    }

    #[test]
    fn test_tool_definition_serialization() {
        let def = ToolDefinition::new(
            "get_weather",
            "Retrieves current weather",
            json!({"type": "object", "properties": {"city": {"type": "string"}}, "required": ["city"]}),
        );
        let json = serde_json::to_value(&def).unwrap();

        assert_eq!(json["name"], "get_weather");
        assert_eq!(json["input_schema"]["required"][0], "city");
    }

    #[test]
    fn test_history_deserializes_from_wire_shape() {
        let wire = json!([
            {"role": "user", "content": "Hi"},
            {"role": "assistant", "content": [{"type": "tool_use", "id": "t1", "name": "add", "input": {"a": 1, "b": 2}}]},
            {"role": "user", "content": [{"type": "tool_result", "tool_use_id": "t1", "content": "3"}]}
        ]);
        let messages: Vec<Message> = serde_json::from_value(wire).unwrap();

        assert_eq!(messages.len(), 3);
        assert!(messages[0].is_user_text());
        assert_eq!(messages[1].tool_uses()[0].name, "add");
        assert!(matches!(
            messages[2].blocks()[0],
            ContentBlock::ToolResult { ref tool_use_id, .. } if tool_use_id == "t1"
        ));
    }
}
