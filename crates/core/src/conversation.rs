//! Conversation turns and parts
//!
//! A conversation is an append-only ordered sequence of turns. A turn is
//! immutable once appended; its part order is the causal/display order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tooling::{ToolCallRequest, ToolResult};

/// Role of the speaker in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// Patient/user message
    User,
    /// Agent message (text or tool-call requests)
    Assistant,
    /// Tool execution results fed back to the model
    Tool,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::Tool => "tool",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ordered part of a turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnPart {
    /// Plain text content
    Text { text: String },
    /// A tool invocation requested by the model
    ToolCall(ToolCallRequest),
    /// The result of a previously requested tool invocation
    ToolResult(ToolResult),
}

impl TurnPart {
    /// Text content if this part is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TurnPart::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Tool call request if this part is one
    pub fn as_tool_call(&self) -> Option<&ToolCallRequest> {
        match self {
            TurnPart::ToolCall(call) => Some(call),
            _ => None,
        }
    }
}

/// A single turn in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Role of the speaker
    pub role: TurnRole,
    /// Ordered parts of the turn
    pub parts: Vec<TurnPart>,
    /// When the turn was appended
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a new turn
    pub fn new(role: TurnRole, parts: Vec<TurnPart>) -> Self {
        Self {
            role,
            parts,
            timestamp: Utc::now(),
        }
    }

    /// Create a user text turn
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnRole::User, vec![TurnPart::Text { text: text.into() }])
    }

    /// Create an assistant text turn
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::new(
            TurnRole::Assistant,
            vec![TurnPart::Text { text: text.into() }],
        )
    }

    /// Create an assistant turn holding the model's tool-call requests
    pub fn assistant_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self::new(
            TurnRole::Assistant,
            calls.into_iter().map(TurnPart::ToolCall).collect(),
        )
    }

    /// Create a tool turn holding one batch of results, in call order
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self::new(
            TurnRole::Tool,
            results.into_iter().map(TurnPart::ToolResult).collect(),
        )
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(TurnPart::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// Tool-call requests carried by this turn
    pub fn tool_calls(&self) -> Vec<&ToolCallRequest> {
        self.parts.iter().filter_map(TurnPart::as_tool_call).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_constructors() {
        let turn = ConversationTurn::user("When is Dr. Silva free?");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.text(), "When is Dr. Silva free?");
        assert!(turn.tool_calls().is_empty());
    }

    #[test]
    fn test_assistant_calls_turn() {
        let call = ToolCallRequest {
            name: "check_availability".to_string(),
            arguments: serde_json::Map::new(),
        };
        let turn = ConversationTurn::assistant_calls(vec![call]);
        assert_eq!(turn.role, TurnRole::Assistant);
        assert_eq!(turn.tool_calls().len(), 1);
        assert!(turn.text().is_empty());
    }

    #[test]
    fn test_part_serialization_tags() {
        let turn = ConversationTurn::assistant_text("hello");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["parts"][0]["type"], "text");
    }
}
