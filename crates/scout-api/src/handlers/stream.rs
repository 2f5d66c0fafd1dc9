use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use scout_graph::RunEvent;
use scout_types::{RunRequest, StreamMode};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

const SSE_BUFFER: usize = 256;

/// Start a run on a thread and stream its events as Server-Sent Events
pub async fn stream_run(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<RunRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    if req.input.messages.is_empty() {
        return Err(ApiError::BadRequest(
            "input.messages must not be empty".to_string(),
        ));
    }

    // 1. Thread must exist
    state
        .store
        .get_thread(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;

    // 2. One run per thread
    let permit = state
        .runs
        .try_acquire(&thread_id)
        .ok_or_else(|| ApiError::RunInProgress(thread_id.clone()))?;

    tracing::info!(
        thread_id = %thread_id,
        assistant_id = %req.assistant_id,
        stream_mode = ?req.stream_mode,
        "Starting run"
    );

    // 3. Run graph (reuses shared Graph instance from AppState)
    let mut run_events = state.graph.spawn_run(thread_id, req.input.messages);

    // 4. The permit lives until the run ends, even if the client hangs up
    let (tx, rx) = mpsc::channel(SSE_BUFFER);
    tokio::spawn(async move {
        let _permit = permit;
        while let Some(event) = run_events.recv().await {
            // Client gone: keep draining so the run completes
            let _ = tx.send(event).await;
        }
    });

    let mode = req.stream_mode;
    let sse_stream = ReceiverStream::new(rx)
        .filter_map(move |event| futures::future::ready(to_sse_event(&event, mode)))
        .map(Ok::<Event, Infallible>);

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

/// Whether an event is sent in the requested stream mode
pub fn is_streamed(event: &RunEvent, mode: StreamMode) -> bool {
    match event {
        RunEvent::Values(_) => mode == StreamMode::Values,
        RunEvent::Message { .. } => mode == StreamMode::MessagesTuple,
        RunEvent::Metadata { .. } | RunEvent::Error { .. } | RunEvent::End => true,
    }
}

fn to_sse_event(event: &RunEvent, mode: StreamMode) -> Option<Event> {
    if !is_streamed(event, mode) {
        return None;
    }

    let wire = event
        .to_stream_event()
        .and_then(|wire| Ok((wire.kind(), wire.data()?)));

    match wire {
        Ok((kind, data)) => Some(Event::default().event(kind.as_str()).data(data)),
        Err(e) => {
            tracing::error!(event = event.name(), error = %e, "Failed to encode run event");
            None
        }
    }
}
