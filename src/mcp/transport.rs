//! JSON-RPC transport to the tool provider
//!
//! The provider answers either with a plain JSON body or with an event
//! stream whose `data: ` lines concatenate to the same JSON document.

use super::McpError;
use crate::config::McpConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const DATA_MARKER: &str = "data: ";
const EVENT_STREAM: &str = "text/event-stream";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

/// HTTP client bound to one tool provider endpoint
pub struct McpTransport {
    client: Client,
    endpoint: String,
    api_key: String,
    next_id: AtomicU64,
}

impl McpTransport {
    pub fn new(config: &McpConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Issue one JSON-RPC call and return the decoded response document
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, McpError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json, text/event-stream")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response
            .text()
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(method, status = status.as_u16(), body = %text, "Tool provider returned error status");
            return Err(McpError::Status(status.as_u16()));
        }

        tracing::debug!(method, content_type = ?content_type, bytes = text.len(), "Tool provider responded");
        decode_envelope(content_type.as_deref(), &text)
    }
}

fn is_event_stream(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.contains(EVENT_STREAM))
}

/// Concatenate the payload of every `data: ` line
pub fn event_stream_payload(body: &str) -> String {
    body.lines()
        .filter_map(|line| line.strip_prefix(DATA_MARKER))
        .collect()
}

/// Decode a response body according to its content type
pub fn decode_envelope(content_type: Option<&str>, body: &str) -> Result<Value, McpError> {
    let json: Cow<'_, str> = if is_event_stream(content_type) {
        let payload = event_stream_payload(body);
        if payload.is_empty() {
            return Err(McpError::EmptyStream);
        }
        Cow::Owned(payload)
    } else {
        Cow::Borrowed(body)
    };

    serde_json::from_str(&json).map_err(|e| McpError::Malformed(e.to_string()))
}

/// Split a JSON-RPC response into its `result`, surfacing a top-level `error`
pub fn rpc_result(mut payload: Value) -> Result<Value, McpError> {
    if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Tool provider error");
        return Err(McpError::Rpc(message.to_string()));
    }
    Ok(payload.get_mut("result").map(Value::take).unwrap_or(Value::Null))
}
