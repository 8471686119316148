//! Trait abstractions for the driver's tool I/O
//!
//! These traits enable testing the driver with mock implementations.

use crate::llm::ToolDefinition;
use crate::mcp::{McpToolProvider, ToolInvocationResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Where the driver gets its tools from
#[async_trait]
pub trait ToolSource: Send + Sync {
    /// Tool definitions for the model
    async fn definitions(&self) -> Arc<[ToolDefinition]>;

    /// Run one tool. Failures come back as error results, never as panics.
    async fn invoke(&self, name: &str, input: &Value) -> ToolInvocationResult;
}

#[async_trait]
impl<T: ToolSource + ?Sized> ToolSource for Arc<T> {
    async fn definitions(&self) -> Arc<[ToolDefinition]> {
        (**self).definitions().await
    }

    async fn invoke(&self, name: &str, input: &Value) -> ToolInvocationResult {
        (**self).invoke(name, input).await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

#[async_trait]
impl ToolSource for McpToolProvider {
    async fn definitions(&self) -> Arc<[ToolDefinition]> {
        self.catalog().get().await
    }

    async fn invoke(&self, name: &str, input: &Value) -> ToolInvocationResult {
        self.invoker().invoke(name, input).await
    }
}
