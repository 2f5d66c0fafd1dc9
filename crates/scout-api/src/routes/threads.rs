use axum::{
    extract::{Path, State},
    Json,
};
use scout_types::{
    CreateThreadRequest, MessagesResponse, SaveStateResponse, Thread, ThreadSnapshot, ThreadState,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Create a thread; repeating a request for an existing id is a no-op
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<Json<Thread>> {
    let thread = state.store.create_thread(req).await?;
    tracing::debug!(thread_id = %thread.thread_id, "Thread ready");
    Ok(Json(thread))
}

pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Thread>> {
    let thread = require_thread(&state, &thread_id).await?;
    Ok(Json(thread))
}

/// Latest checkpoint of a thread
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadSnapshot>> {
    require_thread(&state, &thread_id).await?;
    let snapshot = state.store.snapshot(&thread_id).await?;
    Ok(Json(snapshot))
}

pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<MessagesResponse>> {
    require_thread(&state, &thread_id).await?;
    let snapshot = state.store.snapshot(&thread_id).await?;
    Ok(Json(MessagesResponse {
        messages: snapshot.values.messages,
    }))
}

/// Either what `GET /state` returns or the bare state inside it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SaveStateBody {
    Snapshot(ThreadSnapshot),
    State(ThreadState),
}

/// Re-persist the checkpoint of a thread.
///
/// The body may append messages to the stored history but may not rewrite it,
/// and `chart_json` must match the stored chart.
pub async fn save_state(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(body): Json<SaveStateBody>,
) -> ApiResult<Json<SaveStateResponse>> {
    let values = match body {
        SaveStateBody::Snapshot(snapshot) if snapshot.thread_id != thread_id => {
            return Err(ApiError::BadRequest(format!(
                "snapshot belongs to thread {}",
                snapshot.thread_id
            )));
        }
        SaveStateBody::Snapshot(snapshot) => snapshot.values,
        SaveStateBody::State(values) => values,
    };

    require_thread(&state, &thread_id).await?;

    // Saving under an active run would be overwritten by its next checkpoint
    let _permit = state
        .runs
        .try_acquire(&thread_id)
        .ok_or_else(|| ApiError::RunInProgress(thread_id.clone()))?;

    let stored = state.store.snapshot(&thread_id).await?;
    check_continuation(&stored.values, &values)?;

    let snapshot = state.store.save(&thread_id, values).await?;
    tracing::info!(
        thread_id = %thread_id,
        messages = snapshot.values.messages.len(),
        "Thread state saved"
    );

    Ok(Json(SaveStateResponse {
        thread_id,
        saved: true,
        message_count: snapshot.values.messages.len(),
    }))
}

/// `next` must keep every stored message in place and leave the chart alone
fn check_continuation(stored: &ThreadState, next: &ThreadState) -> ApiResult<()> {
    if !next.messages.starts_with(&stored.messages) {
        return Err(ApiError::BadRequest(format!(
            "messages must extend the {} stored messages without changing them",
            stored.messages.len()
        )));
    }
    if next.chart_json != stored.chart_json {
        return Err(ApiError::BadRequest(
            "chart_json can only be changed by a tool".to_string(),
        ));
    }
    Ok(())
}

async fn require_thread(state: &AppState, thread_id: &str) -> ApiResult<Thread> {
    state
        .store
        .get_thread(thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.to_string()))
}
