//! Mock implementations for testing
//!
//! These mocks let the driver run end to end without network I/O.

use super::traits::ToolSource;
use crate::llm::{
    ContentBlock, LlmError, LlmRequest, LlmResponse, LlmService, StopReason, ToolDefinition, Usage,
};
use crate::mcp::ToolInvocationResult;
use crate::progress::{ProgressEvent, ProgressSink};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Response Builders
// ============================================================================

pub fn response(stop_reason: StopReason, content: Vec<ContentBlock>) -> LlmResponse {
    LlmResponse {
        content,
        stop_reason,
        usage: Usage::default(),
    }
}

pub fn end_turn(text: &str) -> LlmResponse {
    response(StopReason::EndTurn, vec![ContentBlock::text(text)])
}

pub fn tool_use(id: &str, name: &str, input: Value) -> LlmResponse {
    response(StopReason::ToolUse, vec![ContentBlock::tool_use(id, name, input)])
}

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Mock Tool Source
// ============================================================================

/// Tool source with canned outputs per tool name
pub struct MockToolSource {
    definitions: Vec<ToolDefinition>,
    outputs: HashMap<String, ToolInvocationResult>,
    calls: Mutex<Vec<(String, Value)>>,
    cancel_after_call: Option<CancellationToken>,
    observed: Option<Arc<RecordingSink>>,
    /// Events `observed` had received when each call started
    snapshots: Mutex<Vec<Vec<ProgressEvent>>>,
}

impl MockToolSource {
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
            outputs: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            cancel_after_call: None,
            observed: None,
            snapshots: Mutex::new(Vec::new()),
        }
    }

    /// Add a tool with a predefined output
    pub fn with_tool(mut self, name: impl Into<String>, output: ToolInvocationResult) -> Self {
        let name = name.into();
        self.definitions.push(ToolDefinition {
            name: name.clone(),
            description: format!("Mock {name}"),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        });
        self.outputs.insert(name, output);
        self
    }

    /// Cancel `token` once any tool has run, simulating a client leaving
    pub fn cancel_after_call(mut self, token: CancellationToken) -> Self {
        self.cancel_after_call = Some(token);
        self
    }

    /// Snapshot `sink` at the start of every call
    pub fn observing(mut self, sink: Arc<RecordingSink>) -> Self {
        self.observed = Some(sink);
        self
    }

    pub fn recorded_calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Progress seen by the observed sink as each call started, in call order
    pub fn events_at_calls(&self) -> Vec<Vec<ProgressEvent>> {
        self.snapshots.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn definitions(&self) -> Arc<[ToolDefinition]> {
        self.definitions.clone().into()
    }

    async fn invoke(&self, name: &str, input: &Value) -> ToolInvocationResult {
        if let Some(sink) = &self.observed {
            self.snapshots.lock().unwrap().push(sink.events());
        }
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), input.clone()));
        if let Some(token) = &self.cancel_after_call {
            token.cancel();
        }
        self.outputs
            .get(name)
            .cloned()
            .unwrap_or_else(|| ToolInvocationResult::error(format!("Unknown tool: {name}")))
    }
}

// ============================================================================
// Recording Sink
// ============================================================================

/// Progress sink that remembers everything emitted
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_llm_client() {
        let mock = MockLlmClient::new();
        mock.queue_response(end_turn("Hello"));

        let request = LlmRequest {
            system: None,
            messages: vec![],
            tools: vec![],
            max_tokens: Some(100),
        };

        let response = mock.complete(&request).await.unwrap();
        assert_eq!(response.text(), "Hello");
        assert_eq!(response.stop_reason, StopReason::EndTurn);

        // Second call should fail (no more responses)
        assert!(mock.complete(&request).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_tool_source() {
        let tools = MockToolSource::new().with_tool("search_assets", ToolInvocationResult::success("rows"));
        assert_eq!(tools.definitions().await.len(), 1);

        let result = tools.invoke("search_assets", &json!({"query": "x"})).await;
        assert_eq!(result, ToolInvocationResult::success("rows"));

        let result = tools.invoke("unknown", &json!({})).await;
        assert!(result.is_error());
        assert_eq!(tools.recorded_calls().len(), 2);
    }
}
