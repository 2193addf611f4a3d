use std::env;
use std::time::Duration;

use alloy::primitives::Address;
use url::Url;
use x402::PaymentTerms;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_FACILITATOR_TIMEOUT_SECS: u64 = 10;
const DEFAULT_AGENT_URL: &str = "http://127.0.0.1:8001/submit";
const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_RATE_LIMIT_RPM: u32 = 120;

/// Reported by `/agent/status` when neither an address nor a seed is configured.
pub const UNDEPLOYED_AGENT_ADDRESS: &str = "agent1q...";

#[derive(Clone)]
pub struct GatewayConfig {
    /// Server port
    pub port: u16,
    /// Facilitator base URL for verify/settle
    pub facilitator_url: String,
    /// Per-call facilitator timeout
    pub facilitator_timeout: Duration,
    /// Agent `/submit` URL (remote mode)
    pub agent_url: String,
    /// Agent address reported by `/agent/status`
    pub agent_address: String,
    /// Bound on one agent round trip
    pub agent_timeout: Duration,
    /// Run the agent actor in-process instead of calling `agent_url`
    pub agent_embedded: bool,
    /// Seed for the embedded agent's identity
    pub agent_seed: Option<String>,
    /// Network, asset, payee and token of the weather payment
    pub terms: PaymentTerms,
    /// Human-readable weather price (e.g. "0.01")
    pub weather_price: String,
    /// `weather_price` in the token's smallest unit
    pub weather_amount: u128,
    /// CORS allowed origins
    pub allowed_origins: Vec<String>,
    /// Rate limit requests per minute
    pub rate_limit_rpm: u32,
    /// Bearer token required for /metrics endpoint (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("facilitator_url", &self.facilitator_url)
            .field("facilitator_timeout", &self.facilitator_timeout)
            .field("agent_url", &self.agent_url)
            .field("agent_address", &self.agent_address)
            .field("agent_timeout", &self.agent_timeout)
            .field("agent_embedded", &self.agent_embedded)
            .field("agent_seed", &self.agent_seed.as_ref().map(|_| "[REDACTED]"))
            .field("terms", &self.terms)
            .field("weather_price", &self.weather_price)
            .field("weather_amount", &self.weather_amount)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let port = parse_or(&var, "PORT", DEFAULT_PORT)?;

        // Optional: facilitator URL
        let facilitator_url = var("FACILITATOR_URL")
            .unwrap_or_else(|| x402::FACILITATOR_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Url::parse(&facilitator_url)
            .map_err(|_| ConfigError::InvalidUrl(facilitator_url.clone()))?;
        let facilitator_timeout = Duration::from_secs(parse_or(
            &var,
            "FACILITATOR_TIMEOUT_SECS",
            DEFAULT_FACILITATOR_TIMEOUT_SECS,
        )?);

        // Optional: agent
        let agent_url = var("AGENT_URL").unwrap_or_else(|| DEFAULT_AGENT_URL.to_string());
        Url::parse(&agent_url).map_err(|_| ConfigError::InvalidUrl(agent_url.clone()))?;
        let agent_timeout = Duration::from_secs(parse_or(
            &var,
            "AGENT_TIMEOUT_SECS",
            DEFAULT_AGENT_TIMEOUT_SECS,
        )?);
        let agent_embedded = var("AGENT_EMBEDDED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let agent_seed = var("AGENT_SEED");
        if agent_embedded && agent_seed.is_none() {
            return Err(ConfigError::MissingRequired("AGENT_SEED"));
        }
        let agent_address = var("AGENT_ADDRESS")
            .or_else(|| agent_seed.as_deref().map(x402_agent::identity::derive_address))
            .unwrap_or_else(|| UNDEPLOYED_AGENT_ADDRESS.to_string());

        // Optional: payment terms
        let mut terms = PaymentTerms::default();
        if let Some(network) = var("PAYMENT_NETWORK") {
            terms.network = network;
        }
        if let Some(asset) = var("PAYMENT_ASSET") {
            terms.asset = parse_address(asset)?;
        }
        if let Some(pay_to) = var("PAYMENT_PAY_TO") {
            terms.pay_to = parse_address(pay_to)?;
        }
        if let Some(symbol) = var("TOKEN_SYMBOL") {
            terms.token_symbol = symbol;
        }
        terms.token_decimals = parse_or(&var, "TOKEN_DECIMALS", terms.token_decimals)?;

        let weather_price = var("WEATHER_PRICE").unwrap_or_else(|| x402::WEATHER_PRICE.to_string());
        let weather_amount = terms
            .parse_price(&weather_price)
            .map_err(|e| ConfigError::InvalidPrice(format!("{}: {}", weather_price, e)))?;
        if weather_amount == 0 {
            return Err(ConfigError::InvalidPrice(format!(
                "{weather_price}: price must be greater than zero"
            )));
        }

        // Optional: allowed origins
        let allowed_origins: Vec<String> = var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let rate_limit_rpm = parse_or(&var, "RATE_LIMIT_RPM", DEFAULT_RATE_LIMIT_RPM)?;

        // Optional: metrics token
        let metrics_token = var("METRICS_TOKEN");

        if allowed_origins.iter().any(|o| o == "*") {
            tracing::warn!("ALLOWED_ORIGINS contains '*': any browser origin may call the gateway");
        }
        if metrics_token.is_none() {
            tracing::warn!("METRICS_TOKEN not set, /metrics endpoint is publicly accessible");
        }

        Ok(Self {
            port,
            facilitator_url,
            facilitator_timeout,
            agent_url,
            agent_address,
            agent_timeout,
            agent_embedded,
            agent_seed,
            terms,
            weather_price,
            weather_amount,
            allowed_origins,
            rate_limit_rpm,
            metrics_token,
        })
    }

    /// Price as shown to callers, e.g. "0.01 WAT".
    pub fn display_price(&self) -> String {
        self.terms.display_price(self.weather_amount)
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var: key, value: raw }),
    }
}

fn parse_address(raw: String) -> Result<Address, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidAddress(raw))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}
