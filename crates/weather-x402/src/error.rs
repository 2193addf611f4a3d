use thiserror::Error;

/// Errors returned by x402 operations that do not involve the network.
#[derive(Debug, Error)]
pub enum X402Error {
    #[error("invalid payment proof: {0}")]
    InvalidProof(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),
}
