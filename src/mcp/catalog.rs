//! Tool discovery with a process-lifetime cache

use super::transport::{rpc_result, McpTransport};
use super::McpError;
use crate::llm::ToolDefinition;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
struct ListedTool {
    name: Option<String>,
    description: Option<String>,
    #[serde(rename = "inputSchema")]
    input_schema: Option<Value>,
}

/// Discovered tools, cached after the first lookup.
///
/// Whatever the first lookup yields (discovered tools or the fallback) is
/// kept for the rest of the process; discovery is not retried.
pub struct ToolCatalog {
    transport: Arc<McpTransport>,
    cache: OnceCell<Arc<[ToolDefinition]>>,
}

impl ToolCatalog {
    pub fn new(transport: Arc<McpTransport>) -> Self {
        Self {
            transport,
            cache: OnceCell::new(),
        }
    }

    /// Ask the provider for its tool list
    pub async fn discover(&self) -> Result<Vec<ToolDefinition>, McpError> {
        tracing::info!("Discovering tools from tool provider");
        let payload = self.transport.request("tools/list", json!({})).await?;
        let tools = normalize_tools(&rpc_result(payload)?);
        if tools.is_empty() {
            return Err(McpError::NoTools);
        }
        Ok(tools)
    }

    /// Cached catalog, discovering on first use
    pub async fn get(&self) -> Arc<[ToolDefinition]> {
        self.cache
            .get_or_init(|| async {
                match self.discover().await {
                    Ok(tools) => {
                        tracing::info!(
                            tools = ?tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                            "Using discovered tools"
                        );
                        Arc::from(tools)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Tool discovery failed, using fallback definitions");
                        Arc::from(fallback_catalog())
                    }
                }
            })
            .await
            .clone()
    }
}

/// Convert a `tools/list` result into model tool definitions.
///
/// Nameless entries are dropped and the first definition of a name wins.
fn normalize_tools(result: &Value) -> Vec<ToolDefinition> {
    let Some(listed) = result.get("tools").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    listed
        .iter()
        .filter_map(|entry| serde_json::from_value::<ListedTool>(entry.clone()).ok())
        .filter_map(|tool| {
            let name = tool.name.filter(|n| !n.is_empty())?;
            if !seen.insert(name.clone()) {
                return None;
            }
            Some(ToolDefinition {
                description: tool
                    .description
                    .unwrap_or_else(|| format!("Catalog tool: {name}")),
                input_schema: tool.input_schema.unwrap_or_else(|| {
                    json!({"type": "object", "properties": {}, "required": []})
                }),
                name,
            })
        })
        .collect()
}

/// Single generic search operation used when discovery fails
pub fn fallback_catalog() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: "search_assets".to_string(),
        description: "Search the data catalog for assets such as tables, columns, dashboards \
                      and glossary terms. Returns the metadata of every matching asset."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Keywords, asset names or a natural language description of what to find"
                },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of results to return (default: 10)",
                    "default": 10
                }
            },
            "required": ["query"]
        }),
    }]
}
