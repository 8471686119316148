//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{AskRequest, AskResponse, ErrorResponse, PingResponse, ToolsResponse};
use super::AppState;
use crate::llm::LlmMessage;
use crate::progress::{SessionGuard, SessionSink};
use crate::runtime::{DriverError, ToolSource};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/ask", post(ask))
        .route("/api/progress", get(progress_stream))
        .route("/api/tools", get(list_tools))
        .route("/api/ping", get(ping))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Questions
// ============================================================

async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    if req.question.trim().is_empty() {
        return Err(AppError::BadRequest("No question provided".to_string()));
    }

    let history: Vec<LlmMessage> = req.history.into_iter().map(LlmMessage::from).collect();
    tracing::info!(
        history = history.len(),
        streaming = req.stream_id.is_some(),
        "Received question"
    );

    let completion = match req.stream_id {
        Some(stream_id) => {
            let sink = SessionSink::new(state.progress.clone(), stream_id.as_str());
            let cancel = if state.abort_on_disconnect {
                state.progress.cancellation(&stream_id)
            } else {
                None
            };
            state
                .driver
                .run_streaming(&req.question, history, &sink, cancel.as_ref())
                .await?
        }
        None => state.driver.run(&req.question, history).await?,
    };
    tracing::info!(
        iterations = completion.iterations,
        transcript = completion.transcript.len(),
        "Question answered"
    );

    Ok(Json(AskResponse {
        answer: completion.answer,
    }))
}

// ============================================================
// Progress Streaming
// ============================================================

async fn progress_stream(State(state): State<AppState>) -> impl IntoResponse {
    let subscription = state.progress.open();
    let guard = SessionGuard::new(state.progress.clone(), subscription.id.as_str());
    tracing::debug!(active = state.progress.session_count(), "Progress stream opened");
    sse_stream(subscription, guard)
}

// ============================================================
// Catalog and Health
// ============================================================

async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    let tools = state.driver.tools().definitions().await;
    Json(ToolsResponse {
        tools: tools.to_vec(),
    })
}

async fn ping() -> Json<PingResponse> {
    Json(PingResponse::Pong)
}

async fn get_version() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Driver(DriverError),
}

impl From<DriverError> for AppError {
    fn from(e: DriverError) -> Self {
        AppError::Driver(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Driver(e) => {
                let status = match &e {
                    DriverError::NoToolsAvailable => StatusCode::SERVICE_UNAVAILABLE,
                    DriverError::Model(_) => StatusCode::BAD_GATEWAY,
                    DriverError::IterationBudgetExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    DriverError::Cancelled => StatusCode::REQUEST_TIMEOUT,
                };
                tracing::error!(error = %e, status = status.as_u16(), "Question failed");
                (status, e.to_string())
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
