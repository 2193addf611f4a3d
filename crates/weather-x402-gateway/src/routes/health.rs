use std::time::Duration;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::state::AppState;

/// Upper bound on the facilitator probe so liveness never hangs.
const FACILITATOR_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub const CAPABILITIES: [&str; 4] = ["weather", "payments", "image_creation", "general_chat"];

/// GET /health - liveness plus facilitator reachability
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let probe = tokio::time::timeout(
        FACILITATOR_PROBE_TIMEOUT,
        state.weather_gate.facilitator().supported(),
    )
    .await;
    let facilitator = match probe {
        Ok(Ok(_)) => "ok",
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "facilitator probe failed");
            "degraded"
        }
        Err(_) => "degraded",
    };

    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Smart Agent API is operational",
        "service": "x402-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "facilitator": facilitator,
    }))
}

/// GET /agent/status
pub async fn agent_status(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "active",
        "agent_address": state.config.agent_address,
        "endpoint": state.agent.endpoint(),
        "capabilities": CAPABILITIES,
    }))
}

/// Token presented as `Authorization: Bearer <token>`, if any.
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// GET /metrics - gateway registry in text format, bearer-gated when
/// `METRICS_TOKEN` is set
pub async fn metrics(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Some(expected) = state.config.metrics_token.as_deref() {
        let authorized = bearer_token(&req)
            .map(|token| x402::security::constant_time_eq(token.as_bytes(), expected.as_bytes()))
            .unwrap_or(false);
        if !authorized {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "unauthorized",
                "message": "Valid Bearer token required for /metrics"
            }));
        }
    }

    match crate::metrics::render() {
        Ok(text) => HttpResponse::Ok()
            .content_type(prometheus::TEXT_FORMAT)
            .body(text),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            HttpResponse::InternalServerError().body("Failed to encode metrics")
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/agent/status", web::get().to(agent_status))
        .route("/metrics", web::get().to(metrics));
}
