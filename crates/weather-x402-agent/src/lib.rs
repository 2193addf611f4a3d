//! The downstream chat agent.
//!
//! A single actor task owns a [`Responder`] and processes one message at a
//! time from a bounded mailbox. Callers hold an [`AgentHandle`] and get exactly
//! one reply per message, or an error once their deadline passes.
//!
//! # Modules
//!
//! - [`classifier`] - ordered keyword rules behind the [`Responder`] seam
//! - [`store`] - per-conversation exchange log with caps and idle expiry
//! - [`actor`] - mailbox actor and its [`AgentHandle`]
//! - [`envelope`] - wire types for `/submit`
//! - [`routes`] - HTTP surface of the standalone agent process

pub mod actor;
pub mod classifier;
pub mod config;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod routes;
pub mod store;

pub use actor::{spawn_agent, AgentHandle};
pub use classifier::{KeywordClassifier, Responder};
pub use config::AgentConfig;
pub use envelope::{AgentEnvelope, AgentReply, ChatEnvelope};
pub use error::AgentError;
pub use store::{ChatExchange, ConversationStore, StoreLimits};
