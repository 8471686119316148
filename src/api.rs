//! HTTP API for the catalog assistant

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::config::DriverConfig;
use crate::llm::LlmService;
use crate::progress::ProgressHub;
use crate::runtime::{ConversationDriver, ProductionDriver, ToolSource};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub driver: Arc<ProductionDriver>,
    pub progress: Arc<ProgressHub>,
    /// Stop a run once its progress session closes
    pub abort_on_disconnect: bool,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmService>, tools: Arc<dyn ToolSource>, config: DriverConfig) -> Self {
        Self {
            driver: Arc::new(ConversationDriver::new(llm, tools, config)),
            progress: Arc::new(ProgressHub::new()),
            abort_on_disconnect: config.abort_on_disconnect,
        }
    }
}
