//! Per-run conversation state and response interpretation

use crate::llm::{ContentBlock, LlmMessage, LlmResponse, MessageRole, StopReason};
use serde_json::Value;

/// Mutable state owned by one driver run
#[derive(Debug)]
pub struct ConversationState {
    transcript: Vec<LlmMessage>,
    iteration: u32,
    accumulated: String,
}

impl ConversationState {
    /// Client history followed by the new question
    pub fn seed(history: Vec<LlmMessage>, question: &str) -> Self {
        let mut transcript = history;
        transcript.push(LlmMessage::user_text(question));
        Self {
            transcript,
            iteration: 0,
            accumulated: String::new(),
        }
    }

    pub fn transcript(&self) -> &[LlmMessage] {
        &self.transcript
    }

    pub fn into_transcript(self) -> Vec<LlmMessage> {
        self.transcript
    }

    /// The opening exchange gets the system instruction
    pub fn is_opening(&self) -> bool {
        self.transcript.len() <= 2
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Claim the next iteration; false once `max` have been used
    pub fn begin_iteration(&mut self, max: u32) -> bool {
        if self.iteration >= max {
            return false;
        }
        self.iteration += 1;
        true
    }

    pub fn push_assistant(&mut self, content: Vec<ContentBlock>) {
        self.transcript.push(LlmMessage {
            role: MessageRole::Assistant,
            content,
        });
    }

    pub fn push_tool_results(&mut self, results: Vec<ContentBlock>) {
        self.transcript.push(LlmMessage {
            role: MessageRole::User,
            content: results,
        });
    }

    /// Tool calls requested by the latest assistant message
    pub fn pending_tool_calls(&self) -> Vec<ToolCall> {
        self.transcript
            .last()
            .filter(|m| m.role == MessageRole::Assistant)
            .map(|m| {
                m.tool_uses()
                    .map(|(id, name, input)| ToolCall {
                        id: id.to_string(),
                        name: name.to_string(),
                        input: input.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn accumulate(&mut self, text: &str) {
        self.accumulated.push_str(text);
    }
}

/// One tool invocation requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolCall {
    /// The field shown to users while the tool runs
    pub fn primary_input(&self) -> Option<&str> {
        self.input
            .get("query")
            .and_then(Value::as_str)
            .filter(|q| !q.is_empty())
    }
}

/// What the driver does with a model response
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Model is done talking. `clean` is false for stop reasons other than
    /// `end_turn`, which get a stock reply when they carry no text.
    Answer {
        content: Vec<ContentBlock>,
        text: String,
        clean: bool,
    },
    /// Model wants tools run before it continues
    CallTools { content: Vec<ContentBlock>, text: String },
}

/// Decide the next step from a model response
pub fn next_step(response: LlmResponse) -> Step {
    let text = response.text();
    let has_tool_uses = !response.tool_uses().is_empty();
    let LlmResponse {
        content,
        stop_reason,
        ..
    } = response;

    match stop_reason {
        StopReason::ToolUse if has_tool_uses => Step::CallTools { content, text },
        StopReason::EndTurn => Step::Answer {
            content,
            text,
            clean: true,
        },
        StopReason::ToolUse | StopReason::Other(_) => Step::Answer {
            content,
            text,
            clean: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Usage;
    use serde_json::json;

    fn response(stop_reason: StopReason, content: Vec<ContentBlock>) -> LlmResponse {
        LlmResponse {
            content,
            stop_reason,
            usage: Usage::default(),
        }
    }

    #[test]
    fn test_seed_appends_question() {
        let history = vec![
            LlmMessage::user_text("hi"),
            LlmMessage {
                role: MessageRole::Assistant,
                content: vec![ContentBlock::text("hello")],
            },
        ];
        let state = ConversationState::seed(history, "find customer tables");
        assert_eq!(state.transcript().len(), 3);
        assert_eq!(state.transcript()[2], LlmMessage::user_text("find customer tables"));
        assert!(!state.is_opening());
        assert!(ConversationState::seed(vec![], "q").is_opening());
    }

    #[test]
    fn test_iteration_budget() {
        let mut state = ConversationState::seed(vec![], "q");
        for expected in 1..=3 {
            assert!(state.begin_iteration(3));
            assert_eq!(state.iteration(), expected);
        }
        assert!(!state.begin_iteration(3));
        assert_eq!(state.iteration(), 3);
    }

    #[test]
    fn test_pending_tool_calls_in_order() {
        let mut state = ConversationState::seed(vec![], "q");
        assert!(state.pending_tool_calls().is_empty());

        state.push_assistant(vec![
            ContentBlock::text("Searching"),
            ContentBlock::tool_use("a", "search_assets", json!({"query": "orders"})),
            ContentBlock::tool_use("b", "get_lineage", json!({"guid": "123"})),
        ]);
        let calls = state.pending_tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "a");
        assert_eq!(calls[0].primary_input(), Some("orders"));
        assert_eq!(calls[1].name, "get_lineage");
        assert_eq!(calls[1].primary_input(), None);

        state.push_tool_results(vec![ContentBlock::tool_result("a", "x", false)]);
        assert!(state.pending_tool_calls().is_empty());
    }

    #[test]
    fn test_next_step_end_turn() {
        let step = next_step(response(StopReason::EndTurn, vec![ContentBlock::text("done")]));
        assert!(matches!(step, Step::Answer { ref text, clean: true, .. } if text == "done"));
    }

    #[test]
    fn test_next_step_tool_use() {
        let content = vec![
            ContentBlock::text("Let me look"),
            ContentBlock::tool_use("t1", "search_assets", json!({"query": "x"})),
        ];
        let step = next_step(response(StopReason::ToolUse, content.clone()));
        assert_eq!(
            step,
            Step::CallTools {
                content,
                text: "Let me look".to_string()
            }
        );
    }

    #[test]
    fn test_next_step_tool_use_without_calls_is_terminal() {
        let step = next_step(response(StopReason::ToolUse, vec![]));
        assert!(matches!(step, Step::Answer { clean: false, .. }));
    }

    #[test]
    fn test_next_step_other_reason() {
        let step = next_step(response(
            StopReason::Other("max_tokens".to_string()),
            vec![ContentBlock::text("partial")],
        ));
        assert!(matches!(step, Step::Answer { ref text, clean: false, .. } if text == "partial"));
    }
}
