//! Server-Sent Events support for progress sessions

use crate::progress::{ProgressEvent, SessionGuard, Subscription};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert a progress subscription to an SSE stream.
///
/// The stream opens with `stream_ready` and owns `guard`, so the session is
/// closed when the client goes away and axum drops the stream.
pub fn sse_stream(
    subscription: Subscription,
    guard: SessionGuard,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let Subscription { id, receiver } = subscription;
    let ready = ProgressEvent::StreamReady { stream_id: id };
    let init = futures::stream::once(async move { Ok(progress_event_to_axum(&ready)) });

    let events = BroadcastStream::new(receiver).filter_map(move |result| {
        let _session = &guard;
        match result {
            Ok(event) => Some(Ok(progress_event_to_axum(&event))),
            Err(_) => None, // Skip lagged messages
        }
    });

    Sse::new(init.chain(events)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn progress_event_to_axum(event: &ProgressEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_default();
    Event::default().data(data)
}
