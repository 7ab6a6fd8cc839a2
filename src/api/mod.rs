//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod cors;
pub mod dto;
pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

pub use cors::{cors_layer, origin_matches};
pub use dto::{BugResponse, MessageResponse, decode_payload};
pub use error::{ApiError, ApiErrorResponse};
pub use handlers::{
    AppState, create_bug, delete_bug, get_bug, health_check, list_bugs, update_bug,
};

/// Builds the application router with tracing and CORS layers applied.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/bugs", get(list_bugs).post(create_bug))
        .route(
            "/bugs/{id}",
            get(get_bug).put(update_bug).delete(delete_bug),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
