use std::fmt;
use std::time::Duration;

use actix_web::{HttpResponse, ResponseError};

/// Which remote call ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Verify,
    Settle,
    Forward,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Verify => "verify",
            Phase::Settle => "settle",
            Phase::Forward => "forward",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Proof was not a JSON object
    #[error("invalid payment proof: {0}")]
    InvalidProofFormat(String),

    /// Facilitator rejected or could not verify the proof; holds the reason
    #[error("payment verification failed: {0}")]
    VerificationFailed(String),

    /// Facilitator could not settle a verified proof; holds the reason
    #[error("payment settlement failed: {0}")]
    SettlementFailed(String),

    /// Agent unreachable, erroring, or replying out of contract
    #[error("downstream agent unavailable: {0}")]
    DownstreamUnavailable(String),

    /// A bounded wait expired
    #[error("{phase} timed out after {after:?}")]
    TransportTimeout { phase: Phase, after: Duration },

    /// Request body could not be read as a chat message
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Machine-readable reason, reported as `metadata.error`.
    pub fn reason(&self) -> &str {
        match self {
            GatewayError::InvalidProofFormat(_) => "invalid_payment_format",
            GatewayError::VerificationFailed(reason) | GatewayError::SettlementFailed(reason) => {
                reason.as_str()
            }
            GatewayError::DownstreamUnavailable(_) => "downstream_unavailable",
            GatewayError::TransportTimeout { phase, .. } => match phase {
                Phase::Verify => "verification_failed",
                Phase::Settle => "settlement_failed",
                Phase::Forward => "downstream_unavailable",
            },
            GatewayError::MalformedRequest(_) => "invalid_request",
            GatewayError::Internal(_) => "internal_error",
        }
    }

    /// Outcome label reported as the response `status`.
    pub fn status_label(&self) -> &'static str {
        match self {
            GatewayError::DownstreamUnavailable(_)
            | GatewayError::TransportTimeout {
                phase: Phase::Forward,
                ..
            } => "agent_unavailable",
            GatewayError::MalformedRequest(_) | GatewayError::Internal(_) => "error",
            _ => "payment_failed",
        }
    }

    /// Text shown to the caller in the `response` field.
    pub fn user_message(&self) -> &'static str {
        match self {
            GatewayError::InvalidProofFormat(_) => "Invalid payment proof format",
            GatewayError::VerificationFailed(_)
            | GatewayError::TransportTimeout {
                phase: Phase::Verify,
                ..
            } => "Payment verification failed",
            GatewayError::SettlementFailed(_)
            | GatewayError::TransportTimeout {
                phase: Phase::Settle,
                ..
            } => "Payment settlement failed",
            GatewayError::DownstreamUnavailable(_)
            | GatewayError::TransportTimeout {
                phase: Phase::Forward,
                ..
            } => "The agent is currently unavailable. Please try again later.",
            GatewayError::MalformedRequest(_) => "Request body must be a JSON chat message",
            GatewayError::Internal(_) => "An internal error occurred",
        }
    }
}

impl ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        let body = serde_json::json!({
            "error": self.reason(),
            "message": self.user_message(),
        });
        match self {
            GatewayError::InvalidProofFormat(_) => HttpResponse::BadRequest().json(body),
            GatewayError::MalformedRequest(msg) => {
                tracing::debug!("Rejected request body: {}", msg);
                HttpResponse::BadRequest().json(body)
            }
            GatewayError::VerificationFailed(_) | GatewayError::SettlementFailed(_) => {
                HttpResponse::PaymentRequired().json(body)
            }
            GatewayError::DownstreamUnavailable(msg) => {
                tracing::warn!("Downstream agent unavailable: {}", msg);
                HttpResponse::ServiceUnavailable().json(body)
            }
            GatewayError::TransportTimeout { phase, after } => {
                tracing::warn!(%phase, ?after, "upstream timed out");
                HttpResponse::GatewayTimeout().json(body)
            }
            GatewayError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                HttpResponse::InternalServerError().json(body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_fold_into_their_phase() {
        let verify = GatewayError::TransportTimeout {
            phase: Phase::Verify,
            after: Duration::from_secs(10),
        };
        assert_eq!(verify.reason(), "verification_failed");
        assert_eq!(verify.status_label(), "payment_failed");

        let forward = GatewayError::TransportTimeout {
            phase: Phase::Forward,
            after: Duration::from_secs(5),
        };
        assert_eq!(forward.reason(), "downstream_unavailable");
        assert_eq!(forward.status_label(), "agent_unavailable");
    }

    #[test]
    fn test_facilitator_reason_is_passed_through() {
        let err = GatewayError::SettlementFailed("nonce_already_used".to_string());
        assert_eq!(err.reason(), "nonce_already_used");
        assert_eq!(err.user_message(), "Payment settlement failed");
    }

    #[test]
    fn test_error_response_hides_detail() {
        let err = GatewayError::Internal("secret detail".to_string());
        let resp = err.error_response();
        assert_eq!(resp.status(), 500);
    }
}
