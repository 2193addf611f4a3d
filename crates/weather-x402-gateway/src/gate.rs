//! The payment gate: proof parsing, then verify, then settle.
//!
//! One call to [`PaymentGate::evaluate`] walks one request through the state
//! machine and ends in exactly one [`GateOutcome`]. Nothing is retried and the
//! proof itself is never logged.

use std::sync::Arc;
use std::time::Instant;

use x402::{Facilitator, FacilitatorError, PaymentProof, PaymentRequirements};

use crate::error::{GatewayError, Phase};
use crate::metrics::{FACILITATOR_LATENCY, GATE_OUTCOMES};

/// Where the caller put the proof, if anywhere.
#[derive(Debug, Clone, Copy)]
pub enum ProofInput<'a> {
    Absent,
    /// JSON text from the request body
    Body(&'a str),
    /// Base64-encoded JSON from the `X-PAYMENT` header
    Header(&'a str),
}

impl<'a> ProofInput<'a> {
    /// Body field wins; an empty body field counts as absent.
    pub fn resolve(body: Option<&'a str>, header: Option<&'a str>) -> Self {
        match (body.filter(|s| !s.is_empty()), header.filter(|s| !s.trim().is_empty())) {
            (Some(raw), _) => ProofInput::Body(raw),
            (None, Some(encoded)) => ProofInput::Header(encoded),
            (None, None) => ProofInput::Absent,
        }
    }
}

/// What the facilitator recorded for a settled payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction: String,
    pub payer: String,
}

#[derive(Debug)]
pub enum GateOutcome {
    /// No proof: tell the caller what to pay and where.
    PaymentRequired {
        price: String,
        payment_endpoint: String,
    },
    /// Terminal failure. The error carries the reason reported to the caller.
    Rejected(GatewayError),
    /// Paid. The request may proceed.
    Settled(Receipt),
}

impl GateOutcome {
    fn label(&self) -> &'static str {
        match self {
            GateOutcome::PaymentRequired { .. } => "payment_required",
            GateOutcome::Rejected(_) => "payment_failed",
            GateOutcome::Settled(_) => "settled",
        }
    }
}

/// Gate in front of one priced capability.
#[derive(Debug)]
pub struct PaymentGate<F> {
    facilitator: F,
    requirements: Arc<PaymentRequirements>,
    price: String,
    payment_endpoint: String,
}

impl<F: Facilitator> PaymentGate<F> {
    pub fn new(
        facilitator: F,
        requirements: Arc<PaymentRequirements>,
        price: impl Into<String>,
        payment_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            facilitator,
            requirements,
            price: price.into(),
            payment_endpoint: payment_endpoint.into(),
        }
    }

    pub fn facilitator(&self) -> &F {
        &self.facilitator
    }

    pub async fn evaluate(&self, input: ProofInput<'_>) -> GateOutcome {
        let (outcome, step) = self.run(input).await;
        GATE_OUTCOMES
            .with_label_values(&[outcome.label(), step])
            .inc();
        outcome
    }

    /// Walk the state machine. The second value names the step that decided
    /// the outcome; facilitator reason strings never become metric labels.
    async fn run(&self, input: ProofInput<'_>) -> (GateOutcome, &'static str) {
        let parsed = match input {
            ProofInput::Absent => {
                tracing::debug!("no payment proof, quoting price");
                let outcome = GateOutcome::PaymentRequired {
                    price: self.price.clone(),
                    payment_endpoint: self.payment_endpoint.clone(),
                };
                return (outcome, "none");
            }
            ProofInput::Body(raw) => PaymentProof::parse(raw),
            ProofInput::Header(encoded) => PaymentProof::from_header(encoded),
        };

        let proof = match parsed {
            Ok(proof) => proof,
            Err(e) => {
                tracing::info!(error = %e, "rejecting malformed payment proof");
                let err = GatewayError::InvalidProofFormat(e.to_string());
                return (GateOutcome::Rejected(err), "invalid_format");
            }
        };

        let started = Instant::now();
        let verdict = self.facilitator.verify(&proof, &self.requirements).await;
        observe(Phase::Verify, started, &verdict);
        let verdict = match verdict {
            Ok(v) => v,
            Err(e) => {
                return (
                    GateOutcome::Rejected(phase_error(Phase::Verify, e)),
                    "verify_error",
                )
            }
        };
        if !verdict.is_valid {
            tracing::info!(reason = verdict.reason(), "facilitator rejected payment");
            let err = GatewayError::VerificationFailed(verdict.reason().to_string());
            return (GateOutcome::Rejected(err), "verify_rejected");
        }
        tracing::debug!(payer = verdict.payer.as_deref(), "payment verified");

        let started = Instant::now();
        let settlement = self.facilitator.settle(&proof, &self.requirements).await;
        observe(Phase::Settle, started, &settlement);
        let settlement = match settlement {
            Ok(s) => s,
            Err(e) => {
                return (
                    GateOutcome::Rejected(phase_error(Phase::Settle, e)),
                    "settle_error",
                )
            }
        };
        if !settlement.success {
            tracing::warn!(reason = settlement.reason(), "settlement failed");
            let err = GatewayError::SettlementFailed(settlement.reason().to_string());
            return (GateOutcome::Rejected(err), "settle_rejected");
        }

        let receipt = Receipt {
            transaction: settlement.transaction.unwrap_or_default(),
            payer: settlement.payer.or(verdict.payer).unwrap_or_default(),
        };
        tracing::info!(
            transaction = %receipt.transaction,
            payer = %receipt.payer,
            "payment settled"
        );
        (GateOutcome::Settled(receipt), "none")
    }
}

fn observe<T>(phase: Phase, started: Instant, result: &Result<T, FacilitatorError>) {
    let label = match result {
        Ok(_) => "ok",
        Err(e) if e.is_timeout() => "timeout",
        Err(_) => "error",
    };
    let phase = phase.to_string();
    FACILITATOR_LATENCY
        .with_label_values(&[phase.as_str(), label])
        .observe(started.elapsed().as_secs_f64());
}

/// Transport, status and decode failures all end the phase they happened in.
fn phase_error(phase: Phase, err: FacilitatorError) -> GatewayError {
    tracing::warn!(%phase, error = %err, "facilitator call failed");
    match (phase, err) {
        (phase, FacilitatorError::Timeout(after)) => GatewayError::TransportTimeout { phase, after },
        (Phase::Settle, _) => GatewayError::SettlementFailed("settlement_failed".to_string()),
        (_, _) => GatewayError::VerificationFailed("verification_failed".to_string()),
    }
}
