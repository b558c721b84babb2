use crate::interface_adapters::handlers::{health, status};
use crate::interface_adapters::state::AppState;
use axum::{Router, routing::get};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .with_state(state)
}
