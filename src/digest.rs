//! Streaming digest accumulator.
//!
//! ## Encoding
//!
//! Every fold is self-delimiting so distinct graphs can't produce the same
//! byte stream by concatenation:
//!
//! - tag byte: `ShapeTag` discriminant (`0..=14`)
//! - integers: 16-byte little-endian `i128`
//! - floats: 8-byte little-endian IEEE-754 bits
//! - booleans: one byte
//! - text and byte strings: 8-byte little-endian length, then the bytes
//! - identities: 8-byte little-endian token
//! - markers: `SHARED_REFERENCE`, `END_OF_CHILDREN`, `BLOB_PRESENT`,
//!   `BLOB_ABSENT` use byte values no tag can take
//!
//! Order of updates is part of what is fingerprinted.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh32::Xxh32;
use xxhash_rust::xxh64::Xxh64;

use crate::types::{HashWidth, ObjectRef, ShapeTag};

/// Marker folded when an already-visited object is reached again.
pub const SHARED_REFERENCE: u8 = 0xF0;
/// Marker folded after the last child of a compound.
pub const END_OF_CHILDREN: u8 = 0xF1;
/// Presence byte preceding an opaque blob.
pub const BLOB_PRESENT: u8 = 0xF2;
/// Presence byte when no opaque blob was available.
pub const BLOB_ABSENT: u8 = 0xF3;

/// Finished digest value.
///
/// A 32-bit digest is widened to 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Wrap a raw digest.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw digest value.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

enum HashState {
    Xxh64(Xxh64),
    Xxh32(Xxh32),
}

/// Single-use streaming hash state.
///
/// `digest` consumes the accumulator, so a state can't be finished twice.
pub struct DigestAccumulator {
    state: HashState,
    bytes_folded: u64,
}

impl DigestAccumulator {
    /// Create an accumulator of the given width.
    pub fn new(width: HashWidth, seed: u64) -> Self {
        let state = match width {
            HashWidth::Bits64 => HashState::Xxh64(Xxh64::new(seed)),
            HashWidth::Bits32 => HashState::Xxh32(Xxh32::new(seed as u32)),
        };
        Self { state, bytes_folded: 0 }
    }

    /// Fold raw bytes.
    pub fn update(&mut self, bytes: &[u8]) {
        match &mut self.state {
            HashState::Xxh64(h) => h.update(bytes),
            HashState::Xxh32(h) => h.update(bytes),
        }
        self.bytes_folded += bytes.len() as u64;
    }

    /// Number of bytes folded so far.
    pub fn bytes_folded(&self) -> u64 {
        self.bytes_folded
    }

    /// Fold a single marker or tag byte.
    pub fn fold_byte(&mut self, byte: u8) {
        self.update(&[byte]);
    }

    /// Fold a shape tag byte.
    pub fn fold_tag(&mut self, tag: ShapeTag) {
        self.fold_byte(tag.byte());
    }

    /// Fold an object identity.
    pub fn fold_identity(&mut self, object: ObjectRef) {
        self.update(&object.to_le_bytes());
    }

    /// Fold a length-prefixed byte string.
    pub fn fold_len_prefixed(&mut self, bytes: &[u8]) {
        self.update(&(bytes.len() as u64).to_le_bytes());
        self.update(bytes);
    }

    /// Fold a length-prefixed UTF-8 string.
    pub fn fold_str(&mut self, s: &str) {
        self.fold_len_prefixed(s.as_bytes());
    }

    /// Fold an optional blob behind a presence byte.
    pub fn fold_blob(&mut self, blob: Option<&[u8]>) {
        match blob {
            Some(bytes) => {
                self.fold_byte(BLOB_PRESENT);
                self.fold_len_prefixed(bytes);
            }
            None => self.fold_byte(BLOB_ABSENT),
        }
    }

    /// Finish the digest.
    pub fn digest(self) -> Fingerprint {
        match self.state {
            HashState::Xxh64(h) => Fingerprint(h.digest()),
            HashState::Xxh32(h) => Fingerprint(u64::from(h.digest())),
        }
    }
}

impl std::fmt::Debug for DigestAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = match self.state {
            HashState::Xxh64(_) => 64,
            HashState::Xxh32(_) => 32,
        };
        f.debug_struct("DigestAccumulator")
            .field("width", &width)
            .field("bytes_folded", &self.bytes_folded)
            .finish()
    }
}
