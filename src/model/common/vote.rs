use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Number of hex digits following the `0x` prefix.
pub const TRANSACTION_HASH_DIGITS: usize = 64;

/// A cosmetic "transaction hash" shown to the voter as a receipt.
///
/// This is random noise: it is not derived from the vote, is never verified
/// and is not checked for collisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHash(String);

impl TransactionHash {
    /// Draw a fresh hash: `0x` followed by 64 uniformly random hex digits.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut hash = String::with_capacity(2 + TRANSACTION_HASH_DIGITS);
        hash.push_str("0x");
        for _ in 0..TRANSACTION_HASH_DIGITS {
            hash.push(char::from(HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())]));
        }
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
