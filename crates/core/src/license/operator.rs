// Operator-only tier override for internal testing.
//
// A value of this type can only be obtained by presenting a secret whose
// SHA-256 digest matches an expected digest. The environment-driven path that
// builds one exists only with the `operator-override` cargo feature, and the
// expected digest is supplied at build time, never stored in source.

use super::Tier;
use sha2::{Digest, Sha256};

/// Forces the resolved tier, bypassing the license server entirely
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorOverride {
    tier: Tier,
}

impl OperatorOverride {
    /// Unlock the override if `secret` hashes to `expected_digest_hex`
    pub fn unlock(secret: &str, expected_digest_hex: &str, tier: Tier) -> Option<Self> {
        let expected = hex::decode(expected_digest_hex.trim()).ok()?;
        let presented = Sha256::digest(secret.as_bytes());
        if constant_time_eq(&presented, &expected) {
            Some(Self { tier })
        } else {
            None
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Build from `SMARTLEAD_OPERATOR_SECRET` / `SMARTLEAD_OPERATOR_TIER`,
    /// checked against the digest baked in via `SMARTLEAD_OPERATOR_DIGEST`
    #[cfg(feature = "operator-override")]
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let digest = option_env!("SMARTLEAD_OPERATOR_DIGEST")?;
        let secret = lookup("SMARTLEAD_OPERATOR_SECRET")?;
        let tier = lookup("SMARTLEAD_OPERATOR_TIER")?.parse().ok()?;
        Self::unlock(&secret, digest, tier)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
