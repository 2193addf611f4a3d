//! x402 payment gating primitives for the weather gateway.
//!
//! The gateway never verifies signatures itself. It builds fixed
//! [`PaymentRequirements`] for each gated capability, hands the caller's opaque
//! [`PaymentProof`] to a remote facilitator, and acts on the facilitator's
//! answers.
//!
//! # Two-phase facilitator protocol
//!
//! - **verify** ([`Facilitator::verify`]) - is this proof acceptable for these requirements?
//! - **settle** ([`Facilitator::settle`]) - execute the verified payment on-chain
//!
//! Settlement is only ever attempted after a positive verification.
//!
//! # Quick example
//!
//! ```no_run
//! use x402::{Facilitator, HttpFacilitatorClient, PaymentProof, PaymentTerms};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let terms = PaymentTerms::default();
//! let requirements = terms.requirements(10_000_000_000_000_000, Some("weather lookup"));
//! let client = HttpFacilitatorClient::new("http://localhost:3000", std::time::Duration::from_secs(10)).unwrap();
//!
//! let proof = PaymentProof::parse(r#"{"scheme":"exact"}"#).unwrap();
//! let verdict = client.verify(&proof, &requirements).await.unwrap();
//! if verdict.is_valid {
//!     let settled = client.settle(&proof, &requirements).await.unwrap();
//!     println!("tx: {:?}", settled.transaction);
//! }
//! # }
//! ```

pub mod constants;
pub mod error;
pub mod facilitator_client;
pub mod payment;
pub mod requirements;
pub mod response;
pub mod scheme;
pub mod security;

pub use constants::*;
pub use error::X402Error;
pub use facilitator_client::{http_client, FacilitatorError, HttpFacilitatorClient};
pub use payment::*;
pub use requirements::{format_price, parse_price, PaymentTerms};
pub use response::*;
pub use scheme::Facilitator;
