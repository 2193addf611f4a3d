//! Mailbox actor.
//!
//! The actor task is the only owner of the [`Responder`]. Messages are handled
//! strictly one after another; every accepted message gets exactly one reply on
//! its own oneshot channel. A caller that stops waiting simply drops the
//! receiving end and the late reply is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::classifier::Responder;
use crate::envelope::{AgentEnvelope, AgentReply};
use crate::error::AgentError;
use crate::store::{ChatExchange, ConversationStore};

struct Job {
    envelope: AgentEnvelope,
    reply: oneshot::Sender<AgentReply>,
}

/// Cloneable address of a running agent.
#[derive(Clone)]
pub struct AgentHandle {
    tx: mpsc::Sender<Job>,
    store: Arc<ConversationStore>,
    processed: Arc<AtomicU64>,
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("processed", &self.processed())
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Spawn the actor on the current tokio runtime.
pub fn spawn_agent<R: Responder>(
    responder: R,
    store: Arc<ConversationStore>,
    capacity: usize,
) -> AgentHandle {
    let (tx, mut rx) = mpsc::channel::<Job>(capacity.max(1));
    let processed = Arc::new(AtomicU64::new(0));

    let actor_store = Arc::clone(&store);
    let actor_processed = Arc::clone(&processed);
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            let reply = handle(&responder, &actor_store, job.envelope);
            actor_processed.fetch_add(1, Ordering::Relaxed);
            if job.reply.send(reply).is_err() {
                tracing::debug!("caller gave up before the reply was ready");
            }
        }
        tracing::info!("agent mailbox closed, actor stopping");
    });

    AgentHandle {
        tx,
        store,
        processed,
    }
}

fn handle<R: Responder>(
    responder: &R,
    store: &ConversationStore,
    envelope: AgentEnvelope,
) -> AgentReply {
    tracing::info!(
        sender = %envelope.sender,
        user_address = envelope.user_address.as_deref().unwrap_or(""),
        "received message"
    );

    match responder.classify(&envelope.message) {
        Ok(response) => {
            let conversation_id = envelope
                .conversation_id
                .clone()
                .unwrap_or_else(|| format!("conv_{}", chrono::Utc::now().timestamp()));
            store.append(
                &conversation_id,
                ChatExchange::now(envelope.message, response.clone()),
            );
            AgentReply::ok(response, envelope.correlation_id)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to process message");
            AgentReply::failure(e.to_string(), envelope.correlation_id)
        }
    }
}

impl AgentHandle {
    /// Deliver one message and wait up to `timeout` for its reply.
    ///
    /// The deadline covers both waiting for mailbox space and waiting for the
    /// actor to answer.
    pub async fn ask(
        &self,
        envelope: AgentEnvelope,
        timeout: Duration,
    ) -> Result<AgentReply, AgentError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let exchange = async {
            self.tx
                .send(Job {
                    envelope,
                    reply: reply_tx,
                })
                .await
                .map_err(|_| AgentError::Stopped)?;
            reply_rx.await.map_err(|_| AgentError::Stopped)
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout(timeout)),
        }
    }

    /// Messages the actor has finished handling.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{KeywordClassifier, WEATHER_REPLY};
    use crate::envelope::{ChatEnvelope, APOLOGY};

    struct Failing;

    impl Responder for Failing {
        fn classify(&self, _message: &str) -> Result<String, AgentError> {
            Err(AgentError::Responder("model offline".to_string()))
        }
    }

    struct Slow;

    impl Responder for Slow {
        fn classify(&self, message: &str) -> Result<String, AgentError> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(message.to_string())
        }
    }

    fn envelope(message: &str, conversation_id: Option<&str>) -> AgentEnvelope {
        let mut env = ChatEnvelope::new(message);
        env.conversation_id = conversation_id.map(str::to_string);
        env.correlation_id = Some("corr-1".to_string());
        env.into()
    }

    #[tokio::test]
    async fn replies_and_records_exchange() {
        let store = Arc::new(ConversationStore::default());
        let agent = spawn_agent(KeywordClassifier::default(), Arc::clone(&store), 8);

        let reply = agent
            .ask(envelope("weather in Delhi", Some("c-9")), Duration::from_secs(1))
            .await
            .unwrap();

        assert!(reply.success);
        assert_eq!(reply.response, WEATHER_REPLY);
        assert_eq!(reply.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(agent.processed(), 1);

        let history = store.history("c-9");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_message, "weather in Delhi");
    }

    #[tokio::test]
    async fn missing_conversation_id_uses_timestamp_key() {
        let store = Arc::new(ConversationStore::default());
        let agent = spawn_agent(KeywordClassifier::default(), Arc::clone(&store), 8);

        agent
            .ask(envelope("hello", None), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.total_exchanges(), 1);
    }

    #[tokio::test]
    async fn responder_failure_yields_apology() {
        let agent = spawn_agent(Failing, Arc::new(ConversationStore::default()), 8);
        let reply = agent
            .ask(envelope("anything", None), Duration::from_secs(1))
            .await
            .unwrap();

        assert!(!reply.success);
        assert_eq!(reply.response, APOLOGY);
        assert_eq!(reply.correlation_id.as_deref(), Some("corr-1"));
        assert!(agent.store().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn caller_deadline_is_enforced() {
        let agent = spawn_agent(Slow, Arc::new(ConversationStore::default()), 8);
        let err = agent
            .ask(envelope("slow", None), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Timeout(_)));

        // the late reply is dropped and the actor keeps serving
        let reply = agent
            .ask(envelope("next", None), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(reply.response, "next");
    }

    #[tokio::test]
    async fn one_reply_per_message_in_order() {
        let agent = spawn_agent(KeywordClassifier::default(), Arc::new(ConversationStore::default()), 2);
        let mut tasks = Vec::new();
        for i in 0..10 {
            let agent = agent.clone();
            tasks.push(tokio::spawn(async move {
                agent
                    .ask(envelope(&format!("hello {i}"), Some("same")), Duration::from_secs(2))
                    .await
            }));
        }
        for t in tasks {
            assert!(t.await.unwrap().unwrap().success);
        }
        assert_eq!(agent.processed(), 10);
        assert_eq!(agent.store().history("same").len(), 10);
    }
}
