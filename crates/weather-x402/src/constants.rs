use alloy::primitives::{address, Address};

/// Network the payer signs on.
pub const DEFAULT_NETWORK: &str = "polygon-amoy";

/// WAT token contract on Polygon Amoy.
pub const DEFAULT_ASSET: Address = address!("0xec690C24B7451B85B6167a06292e49B5DA822fBE");

/// Merchant address receiving weather payments.
pub const DEFAULT_PAY_TO: Address = address!("0xAF9fC206261DF20a7f2Be9B379B101FAFd983117");

/// WAT has 18 decimal places.
pub const TOKEN_DECIMALS: u32 = 18;

/// Ticker shown in human-readable prices.
pub const TOKEN_SYMBOL: &str = "WAT";

/// Human-readable price of one weather lookup.
pub const WEATHER_PRICE: &str = "0.01";

/// Default facilitator base URL.
pub const FACILITATOR_URL: &str = "http://localhost:3000";

/// Header carrying a base64-encoded proof when the body field is absent.
pub const PAYMENT_HEADER: &str = "X-PAYMENT";
