//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::AppState;

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Server's local calendar date.
    pub date: NaiveDate,
    /// Record store backend in use.
    pub store: &'static str,
}

/// Reports that the server is up, today's date and the store backend.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        date: Local::now().date_naive(),
        store: state.inventory.backend(),
    })
}
