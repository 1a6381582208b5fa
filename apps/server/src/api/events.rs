//! Change-event delivery to connected clients.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures_core::stream::Stream;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use lumen_core::broadcast::BroadcastEvent;

use crate::{error::ApiResult, main_lib::AppState};

/// SSE firehose of broadcast events, one `update` event per sync.
async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = BroadcastStream::new(state.updates.subscribe());
    let stream = tokio_stream::StreamExt::filter_map(receiver, |event| match event {
        Ok(evt) => {
            let sse_event = SseEvent::default().event("update");
            match sse_event.json_data(&evt) {
                Ok(sse_event) => Some(Ok(sse_event)),
                Err(err) => {
                    tracing::warn!("failed to serialize broadcast event: {}", err);
                    None
                }
            }
        }
        // A lagged receiver skipped events; subscribers recover from the
        // recent-events endpoint.
        Err(BroadcastStreamRecvError::Lagged(_)) => None,
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// The subscription manager's ring buffer of recent events, newest first.
async fn recent_events(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BroadcastEvent>>> {
    Ok(Json(state.subscription_manager.recent_events()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(stream_events))
        .route("/events/recent", get(recent_events))
}
