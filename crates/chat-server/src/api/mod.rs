pub mod chat;
pub mod error;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use error::AppError;

/// Build the full HTTP surface over `state`.
pub fn router(state: AppState) -> Router {
    let enable_cors = state.config.http.enable_cors;

    let app = Router::new()
        // Chat endpoints
        .route("/chat", post(chat::chat))
        .route("/api", get(chat::query))

        // Health & status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))

        .with_state(state);

    let app = if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http())
}
