// src/handlers/healthcheck.rs

use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use crate::{extract::Json, state::AppState};

/// Reports service availability, the running environment, and the crate
/// version.
pub async fn healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "available",
        "environment": state.config.env,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
