//! Agent error types.

use std::time::Duration;

use actix_web::{HttpResponse, ResponseError};

use crate::envelope::AgentReply;

/// Errors that can occur while delivering or answering a message.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent mailbox is closed")]
    Stopped,

    #[error("agent did not reply within {0:?}")]
    Timeout(Duration),

    #[error("responder failed: {0}")]
    Responder(String),
}

impl ResponseError for AgentError {
    fn error_response(&self) -> HttpResponse {
        tracing::warn!(error = %self, "agent request failed");
        let body = AgentReply::failure(self.to_string(), None);
        match self {
            AgentError::Stopped | AgentError::Timeout(_) => {
                HttpResponse::ServiceUnavailable().json(body)
            }
            AgentError::Responder(_) => {
                HttpResponse::InternalServerError().json(body)
            }
        }
    }
}
