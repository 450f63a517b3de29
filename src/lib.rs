//! # fingerprint-kernel
//!
//! Structural fingerprints of cyclic in-memory object graphs.
//!
//! The kernel answers one question for a checkpointing tool:
//!
//! > Between two points in a program's execution, did the state reachable
//! > from this variable change?
//!
//! ## Core Contract
//!
//! 1. Given a root object, traverse everything reachable from it exactly once
//! 2. Produce a 64-bit (or 32-bit) **digest** of shapes, values and, optionally, identities
//! 3. Optionally produce an **identity graph** for inspection and value-only comparison
//!
//! ## Architecture
//!
//! ```text
//! root ObjectRef → Fingerprinter ─┬→ ShapeTag dispatch ─→ DigestAccumulator → Fingerprint
//!                       ↓         ├→ GenericFallback     → IdentityGraph
//!                 VisitedSet      └→ trace
//!                       ↓
//!              HostObjectModel (capabilities supplied by the runtime)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same graph, same identities, same options → identical digest
//! - Children are folded in host order: sequences by index, mappings and sets
//!   by the host's iteration order (not sorted)
//! - Shared and cyclic references fold a marker instead of re-descending
//! - Identity folding makes digests process-local; disable it to compare
//!   across runs

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod canonical;
pub mod digest;
pub mod visited;
pub mod idgraph;
pub mod host;
pub mod fallback;
pub mod visitor;

// Re-exports
pub use types::{
    ObjectRef, ShapeTag, FingerprintError,
    FingerprintOptions, TraversalContext, TraversalMode, HashWidth, ParseHashWidthError,
};
pub use digest::{DigestAccumulator, Fingerprint};
pub use visited::VisitedSet;
pub use idgraph::{IdentityGraph, VisitNode, NodeId, GraphToken};
pub use idgraph::render::{NodeView, RenderError, MAX_VIEW_DEPTH};
pub use host::{HostObjectModel, PrimitiveValue, Reduction};
pub use host::memory::{InMemoryHost, InMemoryError, HostObject, CustomReduction};
pub use fallback::{plan_fallback, FallbackPlan};
pub use visitor::{
    Fingerprinter, FingerprintReport, TraversalStats,
    fingerprint, fingerprint_digest, build_identity_graph,
};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex, CanonicalError};

/// Schema version of the fold encoding.
/// Increment on any change that alters digests for unchanged graphs.
pub const FINGERPRINT_SCHEMA_VERSION: &str = "1.0.0";
