//! Object identity tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of a live host object.
///
/// Wraps the host's identity token (an address, handle or arena index) and
/// implements `Ord` so traces and identity sets have a stable order.
///
/// Identities are only meaningful inside one process lifetime. Fingerprints
/// that fold identity must not be compared across runs; disable identity
/// folding for cross-run comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectRef(u64);

impl ObjectRef {
    /// Create an identity from a raw host token.
    pub const fn new(token: u64) -> Self {
        Self(token)
    }

    /// Get the raw token.
    pub const fn token(&self) -> u64 {
        self.0
    }

    /// Canonical byte encoding folded into digests.
    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for ObjectRef {
    fn from(token: u64) -> Self {
        Self(token)
    }
}
