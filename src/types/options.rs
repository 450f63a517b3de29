//! Per-call traversal configuration.
//!
//! ## Determinism
//!
//! Two fingerprints are only comparable when they were computed under the
//! same options. `FingerprintOptions::options_hash` gives a canonical hash of
//! the options that callers store next to each digest.

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash_hex, CanonicalError};
use crate::FINGERPRINT_SCHEMA_VERSION;

/// What a traversal produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Digest only.
    Digest,
    /// Identity graph only.
    IdentityGraph,
    /// Digest and identity graph from the same traversal.
    Both,
}

impl TraversalMode {
    /// Whether this mode produces a digest.
    pub fn wants_digest(self) -> bool {
        matches!(self, Self::Digest | Self::Both)
    }

    /// Whether this mode produces an identity graph.
    pub fn wants_graph(self) -> bool {
        matches!(self, Self::IdentityGraph | Self::Both)
    }
}

impl Default for TraversalMode {
    fn default() -> Self {
        Self::Digest
    }
}

/// Width of the streaming hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashWidth {
    /// xxh32.
    Bits32,
    /// xxh64.
    Bits64,
}

/// Unrecognized hash width string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown hash width: {0} (expected 32 or 64)")]
pub struct ParseHashWidthError(String);

impl std::str::FromStr for HashWidth {
    type Err = ParseHashWidthError;

    /// Accepts `"32"`, `"64"`, `"xxh32"`, `"xxh64"`, `"bits32"`, `"bits64"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "32" | "xxh32" | "bits32" => Ok(Self::Bits32),
            "64" | "xxh64" | "bits64" => Ok(Self::Bits64),
            _ => Err(ParseHashWidthError(s.to_string())),
        }
    }
}

impl Default for HashWidth {
    fn default() -> Self {
        Self::Bits64
    }
}

/// Traversal context for one fingerprint call.
///
/// - `mode`: digest, identity graph, or both
/// - `include_identity`: fold object identity, not just value, for compound
///   shapes. Disabling makes structurally equal but distinct objects digest
///   identically.
/// - `include_trace`: record every identity visited, in visitation order
/// - `hash_width`: 32 or 64-bit digest
/// - `seed`: hash seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintOptions {
    /// What the traversal produces.
    pub mode: TraversalMode,
    /// Fold identities of compound objects into the digest.
    pub include_identity: bool,
    /// Record the visited identities.
    pub include_trace: bool,
    /// Digest width.
    pub hash_width: HashWidth,
    /// Hash seed.
    pub seed: u64,
}

/// Alias matching the engine's terminology.
pub type TraversalContext = FingerprintOptions;

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self {
            mode: TraversalMode::Digest,
            include_identity: true,
            include_trace: false,
            hash_width: HashWidth::Bits64,
            seed: 0,
        }
    }
}

impl FingerprintOptions {
    /// Digest only, identity folded, no trace.
    pub fn digest_only() -> Self {
        Self::default()
    }

    /// Identity graph only.
    pub fn identity_graph() -> Self {
        Self {
            mode: TraversalMode::IdentityGraph,
            ..Self::default()
        }
    }

    /// Digest, identity graph and trace: everything needed to inspect a change.
    pub fn inspection() -> Self {
        Self {
            mode: TraversalMode::Both,
            include_trace: true,
            ..Self::default()
        }
    }

    /// Builder: set identity folding.
    pub fn with_identity(mut self, include_identity: bool) -> Self {
        self.include_identity = include_identity;
        self
    }

    /// Builder: set trace recording.
    pub fn with_trace(mut self, include_trace: bool) -> Self {
        self.include_trace = include_trace;
        self
    }

    /// Builder: set the traversal mode.
    pub fn with_mode(mut self, mode: TraversalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: set the hash width.
    pub fn with_width(mut self, hash_width: HashWidth) -> Self {
        self.hash_width = hash_width;
        self
    }

    /// Canonical hash of the options plus the fingerprint schema version.
    ///
    /// `mode` and `include_trace` don't change the digest and are excluded.
    pub fn options_hash(&self) -> Result<String, CanonicalError> {
        let canonical = (
            FINGERPRINT_SCHEMA_VERSION,
            self.include_identity,
            self.hash_width,
            self.seed,
        );
        canonical_hash_hex(&canonical)
    }
}
