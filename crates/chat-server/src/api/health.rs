use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "seqchat-server"
    }))
}

pub async fn ready_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ready",
        "model_loaded": true,
        "vocab_entries": state.engine.tokenizer().vocabulary().len(),
        "max_steps": state.engine.max_steps()
    }))
}
