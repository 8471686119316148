//! API request and response types

use crate::llm::{ContentBlock, LlmMessage, MessageRole, ToolDefinition};
use serde::{Deserialize, Serialize};

/// Request to answer a question
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    /// Earlier turns of the conversation, oldest first
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    /// Progress session to report into
    pub stream_id: Option<String>,
}

/// A prior turn as sent by the client
#[derive(Debug, Deserialize)]
pub struct HistoryMessage {
    pub role: MessageRole,
    pub content: HistoryContent,
}

/// Clients may send bare strings or full content blocks
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HistoryContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl From<HistoryMessage> for LlmMessage {
    fn from(message: HistoryMessage) -> Self {
        let content = match message.content {
            HistoryContent::Text(text) => vec![ContentBlock::text(text)],
            HistoryContent::Blocks(blocks) => blocks,
        };
        LlmMessage {
            role: message.role,
            content,
        }
    }
}

/// Answer to a question
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Current tool catalog
#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDefinition>,
}

/// Health check reply
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PingResponse {
    Pong,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ask_request_defaults() {
        let req: AskRequest = serde_json::from_value(json!({"question": "find tables"})).unwrap();
        assert_eq!(req.question, "find tables");
        assert!(req.history.is_empty());
        assert!(req.stream_id.is_none());

        let req: AskRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.question.is_empty());
    }

    #[test]
    fn test_history_accepts_text_and_blocks() {
        let req: AskRequest = serde_json::from_value(json!({
            "question": "and columns?",
            "history": [
                {"role": "user", "content": "find customer tables"},
                {"role": "assistant", "content": [{"type": "text", "text": "CUSTOMERS"}]}
            ],
            "stream_id": "abc"
        }))
        .unwrap();

        let history: Vec<LlmMessage> = req.history.into_iter().map(LlmMessage::from).collect();
        assert_eq!(history[0], LlmMessage::user_text("find customer tables"));
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].content, vec![ContentBlock::text("CUSTOMERS")]);
        assert_eq!(req.stream_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_pong_wire_format() {
        assert_eq!(serde_json::to_value(PingResponse::Pong).unwrap(), json!({"type": "pong"}));
    }
}
