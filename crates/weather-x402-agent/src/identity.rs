//! Stable agent addresses derived from a seed phrase.

use sha2::{Digest, Sha256};

/// Prefix shared by every agent address.
pub const ADDRESS_PREFIX: &str = "agent1q";

/// Derive the agent address for a seed.
///
/// The same seed always yields the same address, so a restarted agent keeps
/// its identity and the gateway can hard-code it.
pub fn derive_address(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("{ADDRESS_PREFIX}{}", &hex[..40])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_agent_address(address: &str) -> bool {
        address
            .strip_prefix(ADDRESS_PREFIX)
            .map(|rest| rest.len() == 40 && rest.bytes().all(|b| b.is_ascii_hexdigit()))
            .unwrap_or(false)
    }

    #[test]
    fn derivation_is_stable() {
        let a = derive_address("smart_agent_seed_phrase_12345");
        let b = derive_address("smart_agent_seed_phrase_12345");
        assert_eq!(a, b);
        assert!(is_agent_address(&a));
        assert_ne!(a, derive_address("another seed"));
    }

    #[test]
    fn known_digest() {
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223b00361a3...
        assert_eq!(
            derive_address("abc"),
            "agent1qba7816bf8f01cfea414140de5dae2223b00361a3"
        );
    }

    #[test]
    fn rejects_foreign_shapes() {
        assert!(!is_agent_address("0x1234"));
        assert!(!is_agent_address("agent1qzz"));
    }
}
