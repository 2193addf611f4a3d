//! HTTP client for a remote facilitator's `/verify` and `/settle` endpoints.
//!
//! Every call carries a bounded timeout and is attempted exactly once. Any
//! transport problem, non-200 status or non-JSON body comes back as a
//! [`FacilitatorError`]; the caller decides what that means for the request.

use std::time::Duration;

use serde_json::Value;

use crate::payment::{PaymentProof, PaymentRequest, PaymentRequirements};
use crate::response::{SettleResponse, VerifyResponse};
use crate::scheme::Facilitator;

/// Why a facilitator call produced no usable answer.
#[derive(Debug, thiserror::Error)]
pub enum FacilitatorError {
    #[error("facilitator did not answer within {0:?}")]
    Timeout(Duration),

    #[error("facilitator request failed: {0}")]
    Transport(String),

    #[error("facilitator returned HTTP {0}")]
    Status(u16),

    #[error("facilitator response parse failed: {0}")]
    Decode(String),
}

impl FacilitatorError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FacilitatorError::Timeout(_))
    }
}

/// Outbound HTTP client that never follows redirects.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Talks to a facilitator over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFacilitatorClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpFacilitatorClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FacilitatorError> {
        let http = http_client().map_err(|e| FacilitatorError::Transport(e.to_string()))?;
        Ok(Self::with_client(http, base_url, timeout))
    }

    /// Reuse an existing connection pool.
    pub fn with_client(http: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL advertised to callers as the place payments are settled.
    pub fn settle_endpoint(&self) -> String {
        format!("{}/settle", self.base_url)
    }

    /// Probe `GET /supported`. Used for health reporting only.
    pub async fn supported(&self) -> Result<Value, FacilitatorError> {
        let resp = self
            .http
            .get(format!("{}/supported", self.base_url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(resp).await
    }

    async fn call(
        &self,
        path: &str,
        proof: &PaymentProof,
        requirements: &PaymentRequirements,
    ) -> Result<Value, FacilitatorError> {
        let body = PaymentRequest {
            payment_payload: proof.as_raw(),
            payment_requirements: requirements,
        };

        let resp = self
            .http
            .post(format!("{}/{}", self.base_url, path))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_json(resp).await
    }

    async fn read_json(&self, resp: reqwest::Response) -> Result<Value, FacilitatorError> {
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!(status = %status, "facilitator returned non-success response");
            return Err(FacilitatorError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| FacilitatorError::Decode(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> FacilitatorError {
        if e.is_timeout() {
            FacilitatorError::Timeout(self.timeout)
        } else {
            FacilitatorError::Transport(e.to_string())
        }
    }
}

impl Facilitator for HttpFacilitatorClient {
    async fn verify(
        &self,
        proof: &PaymentProof,
        requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse, FacilitatorError> {
        let value = self.call("verify", proof, requirements).await?;
        Ok(VerifyResponse::from_value(&value))
    }

    async fn settle(
        &self,
        proof: &PaymentProof,
        requirements: &PaymentRequirements,
    ) -> Result<SettleResponse, FacilitatorError> {
        let value = self.call("settle", proof, requirements).await?;
        Ok(SettleResponse::from_value(&value))
    }
}
