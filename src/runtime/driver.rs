//! The agentic loop
//!
//! Each run alternates model requests and tool calls until the model
//! produces a final answer or the iteration budget runs out. A run is a
//! single sequential task: nothing it awaits overlaps with anything else
//! it does.

use super::state::{next_step, ConversationState, Step, ToolCall};
use super::traits::ToolSource;
use crate::config::DriverConfig;
use crate::llm::{ContentBlock, LlmError, LlmMessage, LlmRequest, LlmService};
use crate::mcp::ToolInvocationResult;
use crate::progress::{NoProgress, ProgressEvent, ProgressSink};
use crate::system_prompt::SYSTEM_PROMPT;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Reply used when the model stops without saying anything
pub const APOLOGY: &str = "I apologize, but I was unable to complete your request.";

/// Why a run produced no answer
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Unable to discover tools from the tool provider. Please check your API key and connection.")]
    NoToolsAvailable,
    #[error("Model API error: {0}")]
    Model(#[from] LlmError),
    #[error("Maximum iterations reached. Please try a simpler question.")]
    IterationBudgetExceeded { max: u32 },
    #[error("Conversation cancelled because the progress session closed")]
    Cancelled,
}

/// A finished run
#[derive(Debug)]
pub struct Completion {
    pub answer: String,
    /// Full transcript including the model's final turn
    pub transcript: Vec<LlmMessage>,
    pub iterations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnswerMode {
    /// Answer is the text of the final model turn
    FinalTurn,
    /// Answer is everything the model said across the run
    Accumulated,
}

/// Drives one model through tool use for a question
pub struct ConversationDriver<L, T>
where
    L: LlmService,
    T: ToolSource,
{
    llm: L,
    tools: T,
    config: DriverConfig,
}

impl<L, T> ConversationDriver<L, T>
where
    L: LlmService,
    T: ToolSource,
{
    pub fn new(llm: L, tools: T, config: DriverConfig) -> Self {
        Self { llm, tools, config }
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    /// Answer a question without progress reporting
    pub async fn run(&self, question: &str, history: Vec<LlmMessage>) -> Result<Completion, DriverError> {
        self.drive(question, history, &NoProgress, None, AnswerMode::FinalTurn)
            .await
    }

    /// Answer a question, reporting progress to `sink`.
    ///
    /// When `cancel` fires the run stops before its next model or tool
    /// call; a call already in flight is allowed to finish.
    pub async fn run_streaming(
        &self,
        question: &str,
        history: Vec<LlmMessage>,
        sink: &dyn ProgressSink,
        cancel: Option<&CancellationToken>,
    ) -> Result<Completion, DriverError> {
        self.drive(question, history, sink, cancel, AnswerMode::Accumulated)
            .await
    }

    async fn drive(
        &self,
        question: &str,
        history: Vec<LlmMessage>,
        sink: &dyn ProgressSink,
        cancel: Option<&CancellationToken>,
        mode: AnswerMode,
    ) -> Result<Completion, DriverError> {
        sink.emit(ProgressEvent::progress("Analyzing your question..."));

        let tools = self.tools.definitions().await;
        if tools.is_empty() {
            tracing::error!("No tools available, not contacting the model");
            return Err(DriverError::NoToolsAvailable);
        }

        let mut state = ConversationState::seed(history, question);
        tracing::info!(
            model = %self.llm.model_id(),
            tools = tools.len(),
            history = state.transcript().len() - 1,
            "Starting conversation"
        );

        while state.begin_iteration(self.config.max_iterations) {
            ensure_live(cancel)?;
            tracing::info!(iteration = state.iteration(), "Asking model");
            sink.emit(ProgressEvent::progress("Thinking..."));

            let request = LlmRequest {
                system: state.is_opening().then(|| SYSTEM_PROMPT.to_string()),
                messages: state.transcript().to_vec(),
                tools: tools.to_vec(),
                max_tokens: None,
            };
            let response = self.llm.complete(&request).await?;

            match next_step(response) {
                Step::Answer {
                    content,
                    text,
                    clean,
                } => {
                    state.accumulate(&text);
                    sink.emit(ProgressEvent::content(state.accumulated(), true));

                    let answer = match mode {
                        AnswerMode::FinalTurn => text,
                        AnswerMode::Accumulated => state.accumulated().to_string(),
                    };
                    let answer = if !clean && answer.is_empty() {
                        APOLOGY.to_string()
                    } else {
                        answer
                    };

                    tracing::info!(iterations = state.iteration(), clean, "Conversation finished");
                    let iterations = state.iteration();
                    state.push_assistant(content);
                    return Ok(Completion {
                        answer,
                        transcript: state.into_transcript(),
                        iterations,
                    });
                }
                Step::CallTools { content, text } => {
                    if !text.is_empty() {
                        state.accumulate(&text);
                        state.accumulate("\n");
                        sink.emit(ProgressEvent::content(state.accumulated(), false));
                    }

                    state.push_assistant(content);
                    let calls = state.pending_tool_calls();
                    let mut results = Vec::with_capacity(calls.len());
                    for call in calls {
                        ensure_live(cancel)?;
                        sink.emit(ProgressEvent::progress(tool_status(&call)));
                        tracing::info!(tool = %call.name, tool_use_id = %call.id, "Executing tool");
                        let outcome = self.tools.invoke(&call.name, &call.input).await;
                        results.push(tool_result_block(&call, outcome));
                    }
                    state.push_tool_results(results);
                    sink.emit(ProgressEvent::progress("Analyzing results..."));
                }
            }
        }

        tracing::warn!(max = self.config.max_iterations, "Iteration budget exhausted");
        Err(DriverError::IterationBudgetExceeded {
            max: self.config.max_iterations,
        })
    }
}

fn ensure_live(cancel: Option<&CancellationToken>) -> Result<(), DriverError> {
    match cancel {
        Some(token) if token.is_cancelled() => {
            tracing::info!("Progress session closed, stopping conversation");
            Err(DriverError::Cancelled)
        }
        _ => Ok(()),
    }
}

fn tool_status(call: &ToolCall) -> String {
    format!(
        "Searching catalog: {}",
        call.primary_input().unwrap_or("processing...")
    )
}

fn tool_result_block(call: &ToolCall, outcome: ToolInvocationResult) -> ContentBlock {
    match outcome {
        ToolInvocationResult::Success { data } => ContentBlock::tool_result(&call.id, data, false),
        ToolInvocationResult::Error { message } => {
            ContentBlock::tool_result(&call.id, format!("Error: {message}"), true)
        }
    }
}
