//! Progress sessions pushed to clients while a conversation runs
//!
//! A client opens a session (served as SSE), passes the session id along
//! with its question, and the driver emits status and partial answers into
//! it. Emitting to a session that is gone is a silent no-op.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

const SESSION_BUFFER: usize = 64;

/// Events delivered to a progress session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    StreamReady { stream_id: String },
    Progress { status: String },
    Content { text: String, is_complete: bool },
}

impl ProgressEvent {
    pub fn progress(status: impl Into<String>) -> Self {
        Self::Progress {
            status: status.into(),
        }
    }

    pub fn content(text: impl Into<String>, is_complete: bool) -> Self {
        Self::Content {
            text: text.into(),
            is_complete,
        }
    }
}

/// Destination for a driver run's progress events
pub trait ProgressSink: Send + Sync {
    /// Push an event. Must not block and must not fail.
    fn emit(&self, event: ProgressEvent);
}

/// Sink for runs nobody is watching
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

struct Session {
    sender: broadcast::Sender<ProgressEvent>,
    cancel: CancellationToken,
}

/// Registry of live progress sessions
#[derive(Default)]
pub struct ProgressHub {
    sessions: Mutex<HashMap<String, Session>>,
}

/// A freshly opened session
pub struct Subscription {
    pub id: String,
    pub receiver: broadcast::Receiver<ProgressEvent>,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        // A poisoned map is still structurally valid
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a new session
    pub fn open(&self) -> Subscription {
        let id = uuid::Uuid::new_v4().to_string();
        let (sender, receiver) = broadcast::channel(SESSION_BUFFER);
        self.sessions().insert(
            id.clone(),
            Session {
                sender,
                cancel: CancellationToken::new(),
            },
        );
        tracing::debug!(session_id = %id, "Progress session opened");
        Subscription { id, receiver }
    }

    /// Deliver an event if the session is still connected
    pub fn emit(&self, session_id: &str, event: ProgressEvent) {
        if let Some(session) = self.sessions().get(session_id) {
            // No receiver left means the client is gone; drop the event
            let _ = session.sender.send(event);
        }
    }

    /// Deregister a session and cancel its token
    pub fn close(&self, session_id: &str) {
        if let Some(session) = self.sessions().remove(session_id) {
            session.cancel.cancel();
            tracing::debug!(session_id, "Progress session closed");
        }
    }

    /// Token cancelled when the session closes
    pub fn cancellation(&self, session_id: &str) -> Option<CancellationToken> {
        self.sessions().get(session_id).map(|s| s.cancel.clone())
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }
}

/// Sink bound to one session of a hub
pub struct SessionSink {
    hub: Arc<ProgressHub>,
    session_id: String,
}

impl SessionSink {
    pub fn new(hub: Arc<ProgressHub>, session_id: impl Into<String>) -> Self {
        Self {
            hub,
            session_id: session_id.into(),
        }
    }
}

impl ProgressSink for SessionSink {
    fn emit(&self, event: ProgressEvent) {
        self.hub.emit(&self.session_id, event);
    }
}

/// Closes its session when dropped
pub struct SessionGuard {
    hub: Arc<ProgressHub>,
    session_id: String,
}

impl SessionGuard {
    pub fn new(hub: Arc<ProgressHub>, session_id: impl Into<String>) -> Self {
        Self {
            hub,
            session_id: session_id.into(),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.hub.close(&self.session_id);
    }
}
