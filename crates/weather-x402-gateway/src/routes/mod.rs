pub mod chat;
pub mod health;
pub mod weather;

use actix_web::web;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::metrics::AGENT_FORWARDS;
use crate::router::AgentRouter;
use crate::state::AppState;

/// Request body shared by every chat-style endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    #[serde(default)]
    pub user_address: Option<String>,
    /// JSON-encoded proof; only `/weather` reads it.
    #[serde(default)]
    pub payment_proof: Option<String>,
}

/// Response body shared by every chat-style endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub response: String,
    pub status: String,
    pub metadata: serde_json::Value,
}

impl AgentResponse {
    pub fn new(response: impl Into<String>, status: &str, metadata: serde_json::Value) -> Self {
        Self {
            response: response.into(),
            status: status.to_string(),
            metadata,
        }
    }
}

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// JSON extractor settings: size limit, and unreadable bodies answered as
/// a [`GatewayError::MalformedRequest`].
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| GatewayError::MalformedRequest(err.to_string()).into())
}

/// Forward to the agent and count the result per endpoint.
pub(crate) async fn forward_counted(
    state: &AppState,
    endpoint: &str,
    message: &str,
    user_address: Option<&str>,
) -> Result<String, GatewayError> {
    let result = state.agent.forward(message, user_address).await;
    let label = match &result {
        Ok(_) => "ok",
        Err(GatewayError::TransportTimeout { .. }) => "timeout",
        Err(_) => "unavailable",
    };
    AGENT_FORWARDS.with_label_values(&[endpoint, label]).inc();
    if let Err(e) = &result {
        tracing::warn!(endpoint, error = %e, "agent forward failed");
    }
    result
}
