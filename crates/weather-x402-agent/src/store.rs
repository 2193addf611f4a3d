use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use tokio::task::JoinHandle;

/// One user message and the agent's answer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatExchange {
    /// Unix seconds.
    pub timestamp: i64,
    pub user_message: String,
    pub agent_response: String,
}

impl ChatExchange {
    pub fn now(user_message: impl Into<String>, agent_response: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp(),
            user_message: user_message.into(),
            agent_response: agent_response.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    /// Oldest exchanges are dropped once a conversation holds this many.
    pub max_exchanges: usize,
    /// The least recently active conversation is evicted to make room.
    pub max_conversations: usize,
    /// Conversations idle for longer than this are purged.
    pub ttl: Duration,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_exchanges: 100,
            max_conversations: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug)]
struct Conversation {
    exchanges: VecDeque<ChatExchange>,
    last_active: Instant,
}

/// In-memory conversation log keyed by conversation id. Lost on restart.
#[derive(Debug)]
pub struct ConversationStore {
    conversations: DashMap<String, Conversation>,
    limits: StoreLimits,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(StoreLimits::default())
    }
}

impl ConversationStore {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            conversations: DashMap::new(),
            limits,
        }
    }

    /// Append an exchange, creating the conversation if needed.
    pub fn append(&self, conversation_id: &str, exchange: ChatExchange) {
        if self.limits.max_conversations > 0
            && !self.conversations.contains_key(conversation_id)
            && self.conversations.len() >= self.limits.max_conversations
        {
            self.evict_oldest();
        }

        let mut conv = self
            .conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| Conversation {
                exchanges: VecDeque::new(),
                last_active: Instant::now(),
            });
        conv.exchanges.push_back(exchange);
        while conv.exchanges.len() > self.limits.max_exchanges.max(1) {
            conv.exchanges.pop_front();
        }
        conv.last_active = Instant::now();
    }

    /// Exchanges of one conversation, oldest first. Empty if unknown.
    pub fn history(&self, conversation_id: &str) -> Vec<ChatExchange> {
        self.conversations
            .get(conversation_id)
            .map(|c| c.exchanges.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn total_exchanges(&self) -> usize {
        self.conversations.iter().map(|c| c.exchanges.len()).sum()
    }

    /// Drop conversations idle for longer than the configured TTL.
    pub fn purge_expired(&self) -> usize {
        self.purge_idle_for(self.limits.ttl)
    }

    pub fn purge_idle_for(&self, max_idle: Duration) -> usize {
        let before = self.conversations.len();
        self.conversations
            .retain(|_, conv| conv.last_active.elapsed() < max_idle);
        before.saturating_sub(self.conversations.len())
    }

    /// Remove the least recently active conversation, returning its id.
    pub fn evict_oldest(&self) -> Option<String> {
        // Collect the key first: removing while an iterator guard is held deadlocks.
        let oldest = self
            .conversations
            .iter()
            .min_by_key(|c| c.last_active)
            .map(|c| c.key().clone())?;
        self.conversations.remove(&oldest);
        tracing::debug!(conversation_id = %oldest, "evicted conversation");
        Some(oldest)
    }

    /// Start a background task that purges idle conversations.
    pub fn start_cleanup(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let purged = store.purge_expired();
                if purged > 0 {
                    tracing::info!(purged, "purged idle conversations");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_exchanges: usize, max_conversations: usize) -> StoreLimits {
        StoreLimits {
            max_exchanges,
            max_conversations,
            ttl: Duration::from_secs(3600),
        }
    }

    #[test]
    fn history_is_ordered_and_unknown_is_empty() {
        let store = ConversationStore::default();
        store.append("c1", ChatExchange::now("one", "1"));
        store.append("c1", ChatExchange::now("two", "2"));

        let history = store.history("c1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_message, "one");
        assert_eq!(history[1].agent_response, "2");
        assert!(store.history("nope").is_empty());
    }

    #[test]
    fn per_conversation_cap_drops_oldest() {
        let store = ConversationStore::new(limits(2, 10));
        for i in 0..5 {
            store.append("c", ChatExchange::now(format!("m{i}"), "r"));
        }
        let history = store.history("c");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_message, "m3");
        assert_eq!(history[1].user_message, "m4");
    }

    #[test]
    fn global_cap_evicts_least_recently_active() {
        let store = ConversationStore::new(limits(10, 2));
        store.append("a", ChatExchange::now("x", "y"));
        std::thread::sleep(Duration::from_millis(5));
        store.append("b", ChatExchange::now("x", "y"));
        std::thread::sleep(Duration::from_millis(5));
        // touch "a" so "b" becomes the oldest
        store.append("a", ChatExchange::now("x", "y"));
        std::thread::sleep(Duration::from_millis(5));
        store.append("c", ChatExchange::now("x", "y"));

        assert_eq!(store.len(), 2);
        assert!(store.history("b").is_empty());
        assert_eq!(store.history("a").len(), 2);
        assert_eq!(store.total_exchanges(), 3);
    }

    #[test]
    fn idle_conversations_are_purged() {
        let store = ConversationStore::default();
        store.append("a", ChatExchange::now("x", "y"));
        assert_eq!(store.purge_idle_for(Duration::from_secs(60)), 0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(store.purge_idle_for(Duration::from_millis(10)), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn cleanup_task_purges() {
        let store = Arc::new(ConversationStore::new(StoreLimits {
            max_exchanges: 10,
            max_conversations: 10,
            ttl: Duration::from_millis(10),
        }));
        store.append("a", ChatExchange::now("x", "y"));
        let handle = store.start_cleanup(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
        assert!(store.is_empty());
    }
}
