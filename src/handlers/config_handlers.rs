use axum::extract::State;

use crate::{
    models::{connection::ConnectionParameters, envelope::ApiResponse},
    state::AppState,
};

/// `GET /api/aws-config`
///
/// The connection the server was started with, for pre-filling the UI's
/// connection form. The values are fixed at startup.
pub async fn default_connection(
    State(state): State<AppState>,
) -> ApiResponse<ConnectionParameters> {
    ApiResponse::ok(
        state.defaults().clone(),
        "Loaded default connection settings",
    )
}
