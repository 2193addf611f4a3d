use alloy::primitives::Address;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::X402Error;

/// Payment scheme. Only exact-amount transfers are gated today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Exact,
}

/// What a caller must pay to unlock one gated capability.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: Scheme,
    pub network: String,
    pub asset: Address,
    pub pay_to: Address,
    /// Amount in the token's smallest unit, as a decimal string on the wire.
    pub max_amount_required: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timeout_seconds: Option<u64>,
}

/// Caller-supplied payment proof.
///
/// The gate only checks that it is a JSON object. The original bytes are kept
/// so the facilitator receives exactly what the caller sent.
#[derive(Debug, Clone)]
pub struct PaymentProof(Box<RawValue>);

impl PaymentProof {
    /// Parse a proof submitted as a JSON string.
    pub fn parse(raw: &str) -> Result<Self, X402Error> {
        let value: Box<RawValue> = serde_json::from_str(raw)
            .map_err(|e| X402Error::InvalidProof(format!("not valid JSON: {e}")))?;
        if !value.get().trim_start().starts_with('{') {
            return Err(X402Error::InvalidProof(
                "proof must be a JSON object".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Parse a proof carried base64-encoded in the `X-PAYMENT` header.
    pub fn from_header(encoded: &str) -> Result<Self, X402Error> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| X402Error::InvalidProof(format!("header is not base64: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| X402Error::InvalidProof("header is not UTF-8".to_string()))?;
        Self::parse(&text)
    }

    pub fn as_raw(&self) -> &RawValue {
        &self.0
    }
}

/// Body of both facilitator calls.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest<'a> {
    pub payment_payload: &'a RawValue,
    pub payment_requirements: &'a PaymentRequirements,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_accepts_objects_only() {
        assert!(PaymentProof::parse(r#"{"scheme":"exact"}"#).is_ok());
        assert!(PaymentProof::parse("  {\"a\": 1}").is_ok());
        assert!(PaymentProof::parse("[1,2]").is_err());
        assert!(PaymentProof::parse("\"text\"").is_err());
        assert!(PaymentProof::parse("not json").is_err());
        assert!(PaymentProof::parse("{\"unterminated\": ").is_err());
    }

    #[test]
    fn proof_keeps_original_bytes() {
        let raw = r#"{"b": 2,   "a": [1, 2.50]}"#;
        let proof = PaymentProof::parse(raw).unwrap();
        assert_eq!(proof.as_raw().get(), raw);
    }

    #[test]
    fn proof_from_header() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(r#"{"x":1}"#);
        let proof = PaymentProof::from_header(&encoded).unwrap();
        assert_eq!(proof.as_raw().get(), r#"{"x":1}"#);

        assert!(PaymentProof::from_header("%%%not-base64").is_err());
    }

    #[test]
    fn payment_request_wire_shape() {
        let proof = PaymentProof::parse(r#"{"scheme":"exact","payload":{}}"#).unwrap();
        let requirements = crate::PaymentTerms::default().requirements(5, None);
        let body = PaymentRequest {
            payment_payload: proof.as_raw(),
            payment_requirements: &requirements,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.starts_with(r#"{"paymentPayload":{"scheme":"exact","payload":{}}"#));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let req = &value["paymentRequirements"];
        assert_eq!(req["scheme"], "exact");
        assert_eq!(req["network"], "polygon-amoy");
        assert_eq!(req["maxAmountRequired"], "5");
        assert!(req.get("payTo").is_some());
        assert!(req.get("description").is_none());
    }
}
