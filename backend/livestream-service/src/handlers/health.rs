/// Health probes
use super::AppState;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct ComponentCheck {
    pub status: ComponentStatus,
    pub message: String,
    pub latency_ms: u64,
}

/// GET /api/v1/health
pub async fn health_summary(state: web::Data<AppState>) -> HttpResponse {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "livestream-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "livestream-service"
        })),
    }
}

/// GET /api/v1/health/ready
pub async fn readiness_summary(state: web::Data<AppState>) -> HttpResponse {
    let start = Instant::now();
    let result = state.store.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let postgres = match &result {
        Ok(()) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "PostgreSQL connection successful".to_string(),
            latency_ms,
        },
        Err(e) => {
            tracing::warn!("readiness check failed: {}", e);
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("PostgreSQL connection failed: {}", e),
                latency_ms,
            }
        }
    };

    let body = serde_json::json!({
        "ready": result.is_ok(),
        "checks": { "postgres": postgres },
    });

    if result.is_ok() {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// GET /api/v1/health/live
pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
