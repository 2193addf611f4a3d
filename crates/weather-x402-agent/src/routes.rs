use std::time::Duration;

use actix_web::{web, HttpResponse};

use crate::actor::AgentHandle;
use crate::envelope::ChatEnvelope;
use crate::error::AgentError;

/// How long `/submit` waits for the actor before answering 503.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct AgentState {
    pub handle: AgentHandle,
    pub name: String,
    pub address: String,
    pub submit_timeout: Duration,
}

impl AgentState {
    pub fn new(handle: AgentHandle, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            handle,
            name: name.into(),
            address: address.into(),
            submit_timeout: SUBMIT_TIMEOUT,
        }
    }
}

/// POST /submit - deliver one message, answer with the agent's reply
pub async fn submit(
    state: web::Data<AgentState>,
    body: web::Json<ChatEnvelope>,
) -> Result<HttpResponse, AgentError> {
    let reply = state
        .handle
        .ask(body.into_inner().into(), state.submit_timeout)
        .await?;
    Ok(HttpResponse::Ok().json(reply))
}

/// GET /health
pub async fn health(state: web::Data<AgentState>) -> HttpResponse {
    let status = if state.handle.is_running() { "ok" } else { "stopped" };
    HttpResponse::Ok().json(serde_json::json!({
        "status": status,
        "agent": state.name,
        "address": state.address,
        "version": env!("CARGO_PKG_VERSION"),
        "processed": state.handle.processed(),
        "conversations": state.handle.store().len(),
    }))
}

/// GET /conversations/{id} - read back one conversation log
pub async fn conversation(
    state: web::Data<AgentState>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    let exchanges = state.handle.store().history(&id);
    if exchanges.is_empty() {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "not_found",
            "conversation_id": id,
        }));
    }
    HttpResponse::Ok().json(serde_json::json!({
        "conversation_id": id,
        "exchanges": exchanges,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/submit", web::post().to(submit))
        .route("/health", web::get().to(health))
        .route("/conversations/{id}", web::get().to(conversation));
}
