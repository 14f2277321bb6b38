//! Health check handler.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
///
/// Liveness plus a database ping. Always returns 200; `db_healthy`
/// reports the ping outcome so load balancers can act on it.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_healthy = repliq_db::health_check(&state.pool).await.is_ok();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "db_healthy": db_healthy,
    }))
}
