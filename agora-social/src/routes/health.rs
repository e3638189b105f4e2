use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use agora_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_check = match state.store.ping() {
        Ok(()) => HealthCheck {
            name: "store".into(),
            status: HealthStatus::Healthy,
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            HealthCheck {
                name: "store".into(),
                status: HealthStatus::Unhealthy,
                message: Some(e.to_string()),
            }
        }
    };

    let health = HealthResponse::healthy("agora-social", env!("CARGO_PKG_VERSION"))
        .with_checks(vec![store_check]);
    let status = if health.status == HealthStatus::Healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}
