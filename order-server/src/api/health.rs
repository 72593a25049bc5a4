//! Health checks
//!
//! | Path | Meaning |
//! |------|---------|
//! | /health | summary: `{ "status": "ok", "version": "0.1.0", "database": "ok", "liveSubscribers": 3 }` |
//! | /health/ready | database reachable; 503 otherwise |
//! | /health/live | process is serving requests |

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/health/live", get(live))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    database: &'static str,
    live_subscribers: usize,
}

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    status: &'static str,
}

async fn database_ok(state: &ServerState) -> bool {
    match sqlx::query("SELECT 1").execute(&state.db.pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unavailable");
            false
        }
    }
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let database_ok = database_ok(&state).await;
    Json(HealthResponse {
        status: if database_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if database_ok { "ok" } else { "error" },
        live_subscribers: state.hub.subscriber_count(),
    })
}

async fn ready(State(state): State<ServerState>) -> (StatusCode, Json<ProbeResponse>) {
    if database_ok(&state).await {
        (StatusCode::OK, Json(ProbeResponse { status: "ready" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse {
                status: "unavailable",
            }),
        )
    }
}

async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse { status: "alive" })
}
