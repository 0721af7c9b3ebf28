//! Backend of a web console for locally emulated AWS services.
//!
//! Every request carries its own connection parameters; the server builds a
//! short-lived client from them, performs one logical operation against the
//! emulator and answers with an [`ApiResponse`](models::envelope::ApiResponse)
//! envelope.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// The complete application router with its shared state and layers applied.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    routes::routes::routes()
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
