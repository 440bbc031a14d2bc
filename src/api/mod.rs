//! API module for all HTTP handlers

pub mod stats;
pub mod webhook;

use axum::{Router, routing};

use crate::SharedState;

// Re-export handlers
pub use stats::{root, status};
pub use webhook::{handle_webhook, process_hook};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", routing::get(root))
        .route("/status", routing::get(status))
        .route("/h/{service}/{app_slug}/{api_token}", routing::post(handle_webhook))
        .with_state(state)
}
