//! Ungated endpoints that relay straight to the agent.
//!
//! Like `/weather`, an unreachable agent is reported as 200 with
//! `status = agent_unavailable` rather than as an HTTP error.

use actix_web::{web, HttpResponse};

use super::{forward_counted, AgentResponse, ChatMessage};
use crate::state::AppState;

async fn relay(
    state: &AppState,
    endpoint: &str,
    message: &str,
    user_address: Option<&str>,
) -> HttpResponse {
    let response = match forward_counted(state, endpoint, message, user_address).await {
        Ok(reply) => AgentResponse::new(
            reply,
            "success",
            serde_json::json!({
                "endpoint": endpoint,
                "agent_processed": true,
            }),
        ),
        Err(err) => AgentResponse::new(
            err.user_message(),
            err.status_label(),
            serde_json::json!({
                "endpoint": endpoint,
                "error": err.reason(),
            }),
        ),
    };
    HttpResponse::Ok().json(response)
}

/// POST /payment
pub async fn payment(
    state: web::Data<AppState>,
    body: web::Json<ChatMessage>,
) -> HttpResponse {
    let query = format!("Payment request: {}", body.message);
    relay(&state, "payment", &query, body.user_address.as_deref()).await
}

/// POST /agent/chat
pub async fn agent_chat(
    state: web::Data<AppState>,
    body: web::Json<ChatMessage>,
) -> HttpResponse {
    relay(&state, "agent-chat", &body.message, body.user_address.as_deref()).await
}

/// POST /create-image
pub async fn create_image(
    state: web::Data<AppState>,
    body: web::Json<ChatMessage>,
) -> HttpResponse {
    relay(&state, "create-image", &body.message, body.user_address.as_deref()).await
}

/// POST /create-new
pub async fn create_new(
    state: web::Data<AppState>,
    body: web::Json<ChatMessage>,
) -> HttpResponse {
    relay(&state, "create-new", &body.message, body.user_address.as_deref()).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/payment", web::post().to(payment))
        .route("/agent/chat", web::post().to(agent_chat))
        .route("/create-image", web::post().to(create_image))
        .route("/create-new", web::post().to(create_new));
}
