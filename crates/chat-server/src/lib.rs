// Public API for reusable components

pub mod api;
pub mod config;
pub mod inference;
pub mod state;

// Re-export commonly used types
pub use api::router;
pub use config::ServerConfig;
pub use inference::{InferenceEngine, Reply};
pub use state::AppState;
