//! Catalog assistant - natural-language questions over a data catalog
//!
//! An LLM answers questions by calling catalog tools exposed by a remote
//! tool provider, with live progress streamed to the client.

mod api;
mod config;
mod llm;
mod mcp;
mod progress;
mod runtime;
mod system_prompt;

use api::{create_router, AppState};
use config::AppConfig;
use llm::{AnthropicService, LlmService, LoggingService};
use mcp::McpToolProvider;
use runtime::ToolSource;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_assistant=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    if config.llm.api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY is not set; model requests will be rejected");
    }
    if config.mcp.api_key.is_none() {
        tracing::warn!("CATALOG_MCP_API_KEY is not set; tool discovery will use the fallback catalog");
    }

    let anthropic: Arc<dyn LlmService> = Arc::new(AnthropicService::new(&config.llm));
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(anthropic));
    let tools: Arc<dyn ToolSource> = Arc::new(McpToolProvider::new(&config.mcp));

    tracing::info!(
        model = %config.llm.model,
        tool_provider = %config.mcp.endpoint,
        max_iterations = config.driver.max_iterations,
        abort_on_disconnect = config.driver.abort_on_disconnect,
        "Catalog assistant configured"
    );

    let state = AppState::new(llm, tools, config.driver);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Catalog assistant listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
