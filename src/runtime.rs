//! Conversation runtime
//!
//! The driver runs the model/tool loop for one question; traits decouple it
//! from the concrete model endpoint and tool provider so tests can swap in
//! mocks.

mod driver;
mod state;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use driver::{Completion, ConversationDriver, DriverError, APOLOGY};
pub use traits::ToolSource;

use crate::llm::LlmService;
use std::sync::Arc;

/// Driver over type-erased services, as held by the HTTP layer
pub type ProductionDriver = ConversationDriver<Arc<dyn LlmService>, Arc<dyn ToolSource>>;
