//! Content identifiers: `"sha256-" + hex(sha256(bytes))` (spec §4.5, §6).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cid(String);

impl Cid {
    /// Pure function of the bytes: identical bytes always yield this CID.
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Cid(format!("sha256-{}", hex::encode(digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recompute the hash of `bytes` and compare against this CID.
    pub fn validate(&self, bytes: &[u8]) -> bool {
        *self == Cid::of(bytes)
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
