//! Delivery of authorized requests to the downstream agent.
//!
//! One envelope goes out and exactly one reply is awaited, bounded by the
//! configured timeout. Nothing is retried. Anything other than a successful,
//! correctly correlated reply is a [`GatewayError::DownstreamUnavailable`] or
//! a forward-phase [`GatewayError::TransportTimeout`].

use std::time::Duration;

use x402_agent::{AgentError, AgentHandle, AgentReply, ChatEnvelope};

use crate::error::{GatewayError, Phase};

/// Sender name the agent sees on every gateway message.
pub const GATEWAY_SENDER: &str = "x402-gateway";

pub trait AgentRouter: Send + Sync {
    /// Deliver `message` and return the agent's textual reply.
    fn forward(
        &self,
        message: &str,
        user_address: Option<&str>,
    ) -> impl std::future::Future<Output = Result<String, GatewayError>> + Send;
}

fn envelope(message: &str, user_address: Option<&str>, correlation_id: String) -> ChatEnvelope {
    ChatEnvelope {
        message: message.to_string(),
        user_address: user_address.map(str::to_string),
        conversation_id: None,
        correlation_id: Some(correlation_id),
        sender: Some(GATEWAY_SENDER.to_string()),
    }
}

/// Accept a reply only if it answers this request and reports success.
fn accept(reply: AgentReply, correlation_id: &str) -> Result<String, GatewayError> {
    if reply.correlation_id.as_deref() != Some(correlation_id) {
        return Err(GatewayError::DownstreamUnavailable(format!(
            "reply correlation id {:?} does not match {correlation_id}",
            reply.correlation_id
        )));
    }
    if !reply.success {
        return Err(GatewayError::DownstreamUnavailable(
            reply
                .error
                .unwrap_or_else(|| "agent reported failure".to_string()),
        ));
    }
    Ok(reply.response)
}

/// Agent reached over HTTP at its `/submit` URL.
#[derive(Debug, Clone)]
pub struct HttpAgentRouter {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpAgentRouter {
    pub fn new(http: reqwest::Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::TransportTimeout {
                phase: Phase::Forward,
                after: self.timeout,
            }
        } else {
            GatewayError::DownstreamUnavailable(e.to_string())
        }
    }
}

impl AgentRouter for HttpAgentRouter {
    async fn forward(&self, message: &str, user_address: Option<&str>) -> Result<String, GatewayError> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(%correlation_id, url = %self.url, "forwarding to agent");

        let resp = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(&envelope(message, user_address, correlation_id.clone()))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(GatewayError::DownstreamUnavailable(format!(
                "agent returned HTTP {status}"
            )));
        }

        let bytes = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        let reply: AgentReply = serde_json::from_slice(&bytes).map_err(|e| {
            GatewayError::DownstreamUnavailable(format!("malformed agent reply: {e}"))
        })?;
        accept(reply, &correlation_id)
    }
}

/// Agent actor running inside the gateway process.
#[derive(Debug, Clone)]
pub struct EmbeddedAgentRouter {
    handle: AgentHandle,
    timeout: Duration,
}

impl EmbeddedAgentRouter {
    pub fn new(handle: AgentHandle, timeout: Duration) -> Self {
        Self { handle, timeout }
    }
}

impl AgentRouter for EmbeddedAgentRouter {
    async fn forward(&self, message: &str, user_address: Option<&str>) -> Result<String, GatewayError> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        let reply = self
            .handle
            .ask(
                envelope(message, user_address, correlation_id.clone()).into(),
                self.timeout,
            )
            .await
            .map_err(|e| match e {
                AgentError::Timeout(after) => GatewayError::TransportTimeout {
                    phase: Phase::Forward,
                    after,
                },
                other => GatewayError::DownstreamUnavailable(other.to_string()),
            })?;
        accept(reply, &correlation_id)
    }
}

/// The router held in application state.
#[derive(Debug, Clone)]
pub enum AgentLink {
    Remote(HttpAgentRouter),
    Embedded(EmbeddedAgentRouter),
}

impl AgentLink {
    /// Where requests go, for `/agent/status`.
    pub fn endpoint(&self) -> &str {
        match self {
            AgentLink::Remote(router) => router.url(),
            AgentLink::Embedded(_) => "embedded",
        }
    }
}

impl AgentRouter for AgentLink {
    async fn forward(&self, message: &str, user_address: Option<&str>) -> Result<String, GatewayError> {
        match self {
            AgentLink::Remote(router) => router.forward(message, user_address).await,
            AgentLink::Embedded(router) => router.forward(message, user_address).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use x402_agent::{spawn_agent, ConversationStore, KeywordClassifier, Responder};

    struct Stalling;

    impl Responder for Stalling {
        fn classify(&self, _message: &str) -> Result<String, AgentError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok("too late".to_string())
        }
    }

    #[test]
    fn test_accept_checks_correlation_and_success() {
        let ok = AgentReply::ok("hi".to_string(), Some("c1".to_string()));
        assert_eq!(accept(ok.clone(), "c1").unwrap(), "hi");
        assert!(matches!(
            accept(ok, "c2"),
            Err(GatewayError::DownstreamUnavailable(_))
        ));

        let uncorrelated = AgentReply::ok("hi".to_string(), None);
        assert!(accept(uncorrelated, "c1").is_err());

        let failed = AgentReply::failure("boom".to_string(), Some("c1".to_string()));
        match accept(failed, "c1") {
            Err(GatewayError::DownstreamUnavailable(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embedded_round_trip() {
        let handle = spawn_agent(
            KeywordClassifier::default(),
            Arc::new(ConversationStore::default()),
            4,
        );
        let link = AgentLink::Embedded(EmbeddedAgentRouter::new(handle, Duration::from_secs(1)));
        let reply = link.forward("hello there", Some("0xabc")).await.unwrap();
        assert!(reply.starts_with("👋 Hello!"));
        assert_eq!(link.endpoint(), "embedded");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_embedded_timeout_is_forward_phase() {
        let handle = spawn_agent(Stalling, Arc::new(ConversationStore::default()), 4);
        let router = EmbeddedAgentRouter::new(handle, Duration::from_millis(20));
        let err = router.forward("anything", None).await.unwrap_err();
        assert_eq!(err.reason(), "downstream_unavailable");
        assert_eq!(err.status_label(), "agent_unavailable");
    }

    #[tokio::test]
    async fn test_unreachable_agent_is_unavailable() {
        let router = HttpAgentRouter::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/submit",
            Duration::from_secs(2),
        );
        let err = router.forward("hello", None).await.unwrap_err();
        assert_eq!(err.reason(), "downstream_unavailable");
    }
}
