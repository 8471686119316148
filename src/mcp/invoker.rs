//! Tool invocation against the provider

use super::transport::{rpc_result, McpTransport};
use serde_json::{json, Value};
use std::sync::Arc;

/// Outcome of one tool call, as reported back to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocationResult {
    Success { data: String },
    Error { message: String },
}

impl ToolInvocationResult {
    pub fn success(data: impl Into<String>) -> Self {
        Self::Success { data: data.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Executes `tools/call` requests. Never fails: every problem becomes a
/// [`ToolInvocationResult::Error`].
pub struct ToolInvoker {
    transport: Arc<McpTransport>,
}

impl ToolInvoker {
    pub fn new(transport: Arc<McpTransport>) -> Self {
        Self { transport }
    }

    pub async fn invoke(&self, tool_name: &str, input: &Value) -> ToolInvocationResult {
        tracing::info!(tool = tool_name, input = %input, "Calling tool provider");

        let params = json!({
            "name": tool_name,
            "arguments": input,
        });

        let result = match self.transport.request("tools/call", params).await {
            Ok(payload) => interpret_call_payload(payload),
            Err(e) => ToolInvocationResult::error(e.to_string()),
        };

        if let ToolInvocationResult::Error { message } = &result {
            tracing::warn!(tool = tool_name, error = %message, "Tool call failed");
        }
        result
    }
}

fn text_items(result: &Value) -> impl Iterator<Item = &str> {
    result
        .get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|item| item.get("text").and_then(Value::as_str))
}

/// Map a decoded `tools/call` response to an invocation result
fn interpret_call_payload(payload: Value) -> ToolInvocationResult {
    let result = match rpc_result(payload) {
        Ok(result) => result,
        Err(e) => return ToolInvocationResult::error(e.to_string()),
    };

    if result.get("isError").and_then(Value::as_bool) == Some(true) {
        let message = text_items(&result)
            .next()
            .unwrap_or("Tool provider returned an error");
        return ToolInvocationResult::error(message);
    }

    let texts: Vec<&str> = text_items(&result).collect();
    if texts.is_empty() {
        ToolInvocationResult::success(result.to_string())
    } else {
        ToolInvocationResult::success(texts.join("\n"))
    }
}
