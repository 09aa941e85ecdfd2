use std::sync::Arc;

use aria_db::DbPool;
use aria_erp::ErpGateway;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    gateway: Arc<dyn ErpGateway>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub health: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: HealthCheck,
    pub erp: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, gateway: Arc<dyn ErpGateway>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(liveness))
        .route("/api/v1/health", get(health))
        .with_state(HealthState { db_pool, gateway })
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "ARIA API",
        version: env!("CARGO_PKG_VERSION"),
        status: "online",
        health: "/api/v1/health",
    })
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "healthy" })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let erp = erp_check(state.gateway.as_ref()).await;
    let ready = database.status == "ready" && erp.status == "ready";

    let payload = HealthResponse {
        status: if ready { "healthy" } else { "degraded" },
        database,
        erp,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match aria_db::ping(pool).await {
        Ok(()) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

async fn erp_check(gateway: &dyn ErpGateway) -> HealthCheck {
    match gateway.authenticate().await {
        Ok(session) => {
            HealthCheck { status: "ready", detail: format!("authenticated as uid {}", session.0) }
        }
        Err(error) => {
            warn!(event_name = "system.health.erp_unreachable", error = %error, "ERP health check failed");
            HealthCheck { status: "degraded", detail: error.to_string() }
        }
    }
}
