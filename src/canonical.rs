//! Canonical serialization for configuration hashing.
//!
//! Digests are only comparable when computed under the same options, so the
//! options are hashed into a short tag stored alongside every fingerprint.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: tuples and structs serialize in declaration order
//! - No HashMap allowed: use BTreeMap for maps in hashed data
//! - Hash is xxh64 with seed 0 over compact JSON bytes

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Error type for canonical serialization.
#[derive(Debug, thiserror::Error)]
#[error("Canonical serialization failed: {0}")]
pub struct CanonicalError(#[from] serde_json::Error);

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    Ok(serde_json::to_vec(value)?)
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<u64, CanonicalError> {
    let bytes = to_canonical_bytes(value)?;
    Ok(xxh64(&bytes, 0))
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    Ok(format!("{:016x}", canonical_hash(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        value: i32,
    }

    #[test]
    fn test_determinism() {
        let s = Sample {
            name: "test".to_string(),
            value: 42,
        };

        let h1 = canonical_hash(&s).unwrap();
        let h2 = canonical_hash(&s).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_hex_is_16_digits() {
        let hex = canonical_hash_hex(&(1u8, "x")).unwrap();
        assert_eq!(hex.len(), 16);
    }
}
