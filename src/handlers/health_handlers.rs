//! Liveness of the console backend itself.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
}

/// `GET /healthz`
///
/// Answers without contacting the emulator: which emulator is reachable
/// depends on the parameters of each request, not on the server.
pub async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}
