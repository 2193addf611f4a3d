//! Payment requirement construction and price arithmetic.
//!
//! Prices are parsed and rendered with integer arithmetic only; there is no
//! `f64` anywhere between the configured price and the on-chain amount.

use alloy::primitives::Address;

use crate::constants::{DEFAULT_ASSET, DEFAULT_NETWORK, DEFAULT_PAY_TO, TOKEN_DECIMALS, TOKEN_SYMBOL};
use crate::error::X402Error;
use crate::payment::{PaymentRequirements, Scheme};

/// Where and in what token a capability is paid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTerms {
    pub network: String,
    pub asset: Address,
    pub pay_to: Address,
    pub token_decimals: u32,
    pub token_symbol: String,
}

impl Default for PaymentTerms {
    /// WAT on Polygon Amoy, paid to the merchant address.
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            asset: DEFAULT_ASSET,
            pay_to: DEFAULT_PAY_TO,
            token_decimals: TOKEN_DECIMALS,
            token_symbol: TOKEN_SYMBOL.to_string(),
        }
    }
}

impl PaymentTerms {
    /// Build the fixed requirement tuple for a capability priced at `amount`
    /// smallest units.
    pub fn requirements(&self, amount: u128, description: Option<&str>) -> PaymentRequirements {
        PaymentRequirements {
            scheme: Scheme::Exact,
            network: self.network.clone(),
            asset: self.asset,
            pay_to: self.pay_to,
            max_amount_required: amount.to_string(),
            resource: None,
            description: description.map(String::from),
            mime_type: Some("application/json".to_string()),
            max_timeout_seconds: None,
        }
    }

    /// Parse a human-readable price in this token.
    pub fn parse_price(&self, price: &str) -> Result<u128, X402Error> {
        parse_price(price, self.token_decimals)
    }

    /// Render `amount` as `"<amount> <symbol>"`, e.g. `"0.01 WAT"`.
    pub fn display_price(&self, amount: u128) -> String {
        format_price(amount, self.token_decimals, &self.token_symbol)
    }
}

/// Parse a price string like `"0.01"`, `"$0.01"` or `"0.01 WAT"` into smallest units.
pub fn parse_price(price: &str, decimals: u32) -> Result<u128, X402Error> {
    let cleaned: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return Err(X402Error::InvalidPrice(format!(
            "'{price}': no numeric content"
        )));
    }

    let overflow = || X402Error::InvalidPrice(format!("'{price}': overflow"));
    let multiplier = 10u128.checked_pow(decimals).ok_or_else(overflow)?;

    let (integer_part, fractional_part) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    if fractional_part.contains('.') {
        return Err(X402Error::InvalidPrice(format!(
            "'{price}': more than one decimal point"
        )));
    }

    let integer: u128 = if integer_part.is_empty() {
        0
    } else {
        integer_part
            .parse()
            .map_err(|e| X402Error::InvalidPrice(format!("'{price}': integer part: {e}")))?
    };

    // Digits beyond the token's precision are truncated.
    let decimals = decimals as usize;
    let frac_str = &fractional_part[..fractional_part.len().min(decimals)];
    let fractional: u128 = if frac_str.is_empty() {
        0
    } else {
        frac_str
            .parse()
            .map_err(|e| X402Error::InvalidPrice(format!("'{price}': fractional part: {e}")))?
    };
    let scale = 10u128.pow((decimals - frac_str.len()) as u32);

    integer
        .checked_mul(multiplier)
        .and_then(|i| fractional.checked_mul(scale).and_then(|f| i.checked_add(f)))
        .ok_or_else(overflow)
}

/// Render smallest units as a trimmed decimal with the token symbol.
pub fn format_price(amount: u128, decimals: u32, symbol: &str) -> String {
    let multiplier = 10u128.pow(decimals);
    let integer = amount / multiplier;
    let fractional = amount % multiplier;

    if fractional == 0 {
        return format!("{integer} {symbol}");
    }

    let digits = format!("{:0width$}", fractional, width = decimals as usize);
    format!("{integer}.{} {symbol}", digits.trim_end_matches('0'))
}
