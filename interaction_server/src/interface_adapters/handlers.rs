use axum::{Json, extract::State};

use crate::interface_adapters::protocol::StatusResponse;
use crate::interface_adapters::state::AppState;

// Liveness only; says nothing about the session connection.
pub async fn health() -> &'static str {
    "ok"
}

// Session connection status plus a summary of the shared world state.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let summary = state.ctx.summary().await;
    Json(StatusResponse::new(state.ctx.status(), summary))
}
