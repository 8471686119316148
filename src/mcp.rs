//! Client for the remote tool provider
//!
//! Tool discovery (`tools/list`) feeds the catalog handed to the model, and
//! tool invocation (`tools/call`) executes what the model asks for.

mod catalog;
mod invoker;
mod transport;

pub use catalog::ToolCatalog;
pub use invoker::{ToolInvocationResult, ToolInvoker};
pub use transport::McpTransport;

use crate::config::McpConfig;
use std::sync::Arc;
use thiserror::Error;

/// Tool provider failures
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Tool provider error: {0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
    #[error("No data received from tool provider")]
    EmptyStream,
    #[error("Malformed response from tool provider: {0}")]
    Malformed(String),
    /// Top-level JSON-RPC error object
    #[error("{0}")]
    Rpc(String),
    #[error("Tool provider listed no tools")]
    NoTools,
}

/// Catalog and invoker sharing one connection to the provider
pub struct McpToolProvider {
    catalog: ToolCatalog,
    invoker: ToolInvoker,
}

impl McpToolProvider {
    pub fn new(config: &McpConfig) -> Self {
        let transport = Arc::new(McpTransport::new(config));
        Self {
            catalog: ToolCatalog::new(transport.clone()),
            invoker: ToolInvoker::new(transport),
        }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn invoker(&self) -> &ToolInvoker {
        &self.invoker
    }
}
