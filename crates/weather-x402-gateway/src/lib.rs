//! Payment-gated gateway in front of the chat agent.
//!
//! `/weather` runs every request through a [`gate::PaymentGate`] (verify, then
//! settle, against the facilitator) before the agent sees it. The other chat
//! endpoints relay to the agent directly.

pub mod config;
pub mod cors;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod router;
pub mod routes;
pub mod state;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gate::{GateOutcome, PaymentGate, ProofInput};
pub use router::{AgentLink, AgentRouter};
pub use state::AppState;
