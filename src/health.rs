use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let now = OffsetDateTime::now_utc();
    let uptime = now - state.started_at;
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": uptime.whole_seconds(),
        "timestamp": now.format(&Rfc3339).unwrap_or_default(),
    }))
}

// Nothing external to wait on: storage is in memory.
pub async fn ready() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}
