//! The facilitator seam.
//!
//! [`Facilitator`] is what the payment gate talks to. The production
//! implementation is [`crate::facilitator_client::HttpFacilitatorClient`];
//! tests substitute scripted facilitators.

use crate::facilitator_client::FacilitatorError;
use crate::payment::{PaymentProof, PaymentRequirements};
use crate::response::{SettleResponse, VerifyResponse};

/// Facilitator-side operations, called strictly in sequence: `settle` only
/// after `verify` returned a valid verdict.
///
/// Both calls are idempotent by contract. A proof that has already been
/// settled must fail a second `settle`; enforcing that is the facilitator's job.
pub trait Facilitator: Send + Sync {
    /// Check a proof against the requirements without moving funds.
    fn verify(
        &self,
        proof: &PaymentProof,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<VerifyResponse, FacilitatorError>> + Send;

    /// Execute a verified payment.
    fn settle(
        &self,
        proof: &PaymentProof,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<SettleResponse, FacilitatorError>> + Send;
}
