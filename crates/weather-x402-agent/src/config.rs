use std::env;
use std::time::Duration;

use crate::identity::derive_address;
use crate::store::StoreLimits;

const DEFAULT_PORT: u16 = 8001;
const DEFAULT_NAME: &str = "SmartAgent";
const DEFAULT_MAILBOX_CAPACITY: usize = 64;
const DEFAULT_CONVERSATION_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_EXCHANGES: usize = 100;
const DEFAULT_MAX_CONVERSATIONS: usize = 10_000;

#[derive(Clone)]
pub struct AgentConfig {
    /// Server port
    pub port: u16,
    /// Display name used in logs and `/health`
    pub name: String,
    /// Seed the agent address is derived from. Never logged.
    pub seed: String,
    /// Derived from `seed`
    pub address: String,
    /// Bounded mailbox size
    pub mailbox_capacity: usize,
    pub store_limits: StoreLimits,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("port", &self.port)
            .field("name", &self.name)
            .field("seed", &"[REDACTED]")
            .field("address", &self.address)
            .field("mailbox_capacity", &self.mailbox_capacity)
            .field("store_limits", &self.store_limits)
            .finish()
    }
}

impl AgentConfig {
    /// Build a config from a seed with every other setting at its default.
    pub fn with_seed(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        Self {
            port: DEFAULT_PORT,
            name: DEFAULT_NAME.to_string(),
            address: derive_address(&seed),
            seed,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            store_limits: StoreLimits {
                max_exchanges: DEFAULT_MAX_EXCHANGES,
                max_conversations: DEFAULT_MAX_CONVERSATIONS,
                ttl: Duration::from_secs(DEFAULT_CONVERSATION_TTL_SECS),
            },
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Required: seed
        let seed = lookup("AGENT_SEED")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingRequired("AGENT_SEED"))?;

        let mut config = Self::with_seed(seed);

        if let Some(port) = parse_var(&lookup, "AGENT_PORT")? {
            config.port = port;
        }
        if let Some(name) = lookup("AGENT_NAME").filter(|s| !s.is_empty()) {
            config.name = name;
        }
        if let Some(capacity) = parse_var::<usize, _>(&lookup, "AGENT_MAILBOX_CAPACITY")? {
            if capacity == 0 {
                return Err(ConfigError::InvalidValue {
                    var: "AGENT_MAILBOX_CAPACITY",
                    value: "0".to_string(),
                });
            }
            config.mailbox_capacity = capacity;
        }
        if let Some(ttl) = parse_var::<u64, _>(&lookup, "CONVERSATION_TTL_SECS")? {
            config.store_limits.ttl = Duration::from_secs(ttl);
        }
        if let Some(max) = parse_var(&lookup, "CONVERSATION_MAX_EXCHANGES")? {
            config.store_limits.max_exchanges = max;
        }
        if let Some(max) = parse_var(&lookup, "CONVERSATION_MAX_COUNT")? {
            config.store_limits.max_conversations = max;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var).filter(|s| !s.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn seed_is_required() {
        let err = AgentConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired("AGENT_SEED")));
    }

    #[test]
    fn defaults_apply() {
        let config = AgentConfig::from_lookup(lookup(&[("AGENT_SEED", "s")])).unwrap();
        assert_eq!(config.port, 8001);
        assert_eq!(config.name, "SmartAgent");
        assert_eq!(config.mailbox_capacity, 64);
        assert_eq!(config.store_limits.max_exchanges, 100);
        assert_eq!(config.store_limits.max_conversations, 10_000);
        assert_eq!(config.store_limits.ttl, Duration::from_secs(3600));
        assert_eq!(config.address, derive_address("s"));
    }

    #[test]
    fn overrides_and_bad_values() {
        let config = AgentConfig::from_lookup(lookup(&[
            ("AGENT_SEED", "s"),
            ("AGENT_PORT", "9100"),
            ("CONVERSATION_MAX_EXCHANGES", "5"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.store_limits.max_exchanges, 5);

        let err =
            AgentConfig::from_lookup(lookup(&[("AGENT_SEED", "s"), ("AGENT_PORT", "eighty")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "AGENT_PORT", .. }));

        let err = AgentConfig::from_lookup(lookup(&[
            ("AGENT_SEED", "s"),
            ("AGENT_MAILBOX_CAPACITY", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn debug_redacts_seed() {
        let config = AgentConfig::with_seed("super secret seed");
        let out = format!("{config:?}");
        assert!(!out.contains("super secret seed"));
        assert!(out.contains("[REDACTED]"));
    }
}
