use axum::{
    extract::{Query, State},
    Json,
};
use chat_protocol::{ChatRequest, ChatResponse, MessageResponse, QueryParams};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::error::AppError;
use crate::inference::Reply;
use crate::state::AppState;

/// `POST /chat`
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let reply = generate_reply(&state, req.text).await?;
    Ok(Json(ChatResponse { response: reply.text }))
}

/// `GET /api?query=...`
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<MessageResponse>, AppError> {
    let reply = generate_reply(&state, params.query).await?;
    Ok(Json(MessageResponse { message: reply.text }))
}

/// Run the blocking decode loop off the async runtime, bounded by the
/// configured request timeout. On timeout the decode task is told to stop
/// at its next step.
async fn generate_reply(state: &AppState, text: String) -> Result<Reply, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::bad_request("text must not be empty"));
    }

    let request_id = uuid::Uuid::new_v4();
    tracing::debug!(%request_id, bytes = text.len(), "Received chat request");

    let engine = state.engine.clone();
    let limit = state.config.http.request_timeout();
    let cancel = Arc::new(AtomicBool::new(false));
    let task_cancel = cancel.clone();
    let task = tokio::task::spawn_blocking(move || engine.reply_with_cancel(&text, &task_cancel));

    let reply = match tokio::time::timeout(limit, task).await {
        Ok(joined) => joined??,
        Err(_) => {
            cancel.store(true, Ordering::Relaxed);
            tracing::warn!(%request_id, ?limit, "Reply generation timed out");
            return Err(AppError::timeout(limit));
        }
    };

    tracing::debug!(
        %request_id,
        steps = reply.steps,
        finish_reason = ?reply.finish_reason,
        latency_ms = reply.latency_ms,
        "Reply generated"
    );
    Ok(reply)
}
