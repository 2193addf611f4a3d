use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reason reported when the facilitator rejects without saying why.
pub const UNKNOWN_REASON: &str = "unknown";

/// Normalized answer from the facilitator's `/verify` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

impl VerifyResponse {
    /// Read only the documented fields; anything else counts as a rejection.
    pub fn from_value(value: &Value) -> Self {
        Self {
            is_valid: value.get("isValid").and_then(Value::as_bool).unwrap_or(false),
            invalid_reason: string_field(value, "invalidReason"),
            payer: string_field(value, "payer"),
        }
    }

    pub fn reason(&self) -> &str {
        self.invalid_reason.as_deref().unwrap_or(UNKNOWN_REASON)
    }
}

/// Normalized answer from the facilitator's `/settle` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    /// Transaction hash, if settlement succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

impl SettleResponse {
    pub fn from_value(value: &Value) -> Self {
        Self {
            success: value.get("success").and_then(Value::as_bool).unwrap_or(false),
            error_reason: string_field(value, "errorReason"),
            payer: string_field(value, "payer"),
            transaction: string_field(value, "transaction"),
            network: string_field(value, "network"),
        }
    }

    pub fn reason(&self) -> &str {
        self.error_reason.as_deref().unwrap_or(UNKNOWN_REASON)
    }
}

/// Non-empty string field, or `None` for missing, null, empty or non-string values.
fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verify_reads_documented_fields() {
        let v = VerifyResponse::from_value(&json!({
            "isValid": false,
            "invalidReason": "authorization_expired",
            "payer": "0xabc",
        }));
        assert!(!v.is_valid);
        assert_eq!(v.reason(), "authorization_expired");
        assert_eq!(v.payer.as_deref(), Some("0xabc"));
    }

    #[test]
    fn verify_unexpected_shapes_become_unknown_rejections() {
        for body in [json!([]), json!("ok"), json!({"isValid": "true"}), json!({})] {
            let v = VerifyResponse::from_value(&body);
            assert!(!v.is_valid, "{body} must not verify");
            assert_eq!(v.reason(), UNKNOWN_REASON);
        }

        let v = VerifyResponse::from_value(&json!({"isValid": false, "invalidReason": 42}));
        assert_eq!(v.reason(), UNKNOWN_REASON);
    }

    #[test]
    fn settle_reads_documented_fields() {
        let s = SettleResponse::from_value(&json!({
            "success": true,
            "transaction": "0xfeed",
            "payer": "0xabc",
            "network": "polygon-amoy",
        }));
        assert!(s.success);
        assert_eq!(s.transaction.as_deref(), Some("0xfeed"));
        assert_eq!(s.network.as_deref(), Some("polygon-amoy"));
    }

    #[test]
    fn settle_empty_transaction_is_absent() {
        // The facilitator sends `transaction: ""` on failure.
        let s = SettleResponse::from_value(&json!({
            "success": false,
            "errorReason": "nonce_already_used",
            "transaction": "",
        }));
        assert!(!s.success);
        assert_eq!(s.reason(), "nonce_already_used");
        assert!(s.transaction.is_none());
    }
}
