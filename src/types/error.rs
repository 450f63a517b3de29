//! Fingerprint error taxonomy.
//!
//! Every variant aborts the traversal. There is no partial digest: a partial
//! digest could hide a real change, so callers treat any error as
//! "fingerprint unavailable" and assume the value changed.

use super::object_ref::ObjectRef;

/// Error type for fingerprint and identity-graph traversals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FingerprintError {
    /// No dispatch rule matched and the object cannot be reduced or serialized.
    #[error("Unsupported shape for object {object} ({type_name})")]
    UnsupportedShape {
        /// Offending object.
        object: ObjectRef,
        /// Host type name.
        type_name: String,
    },
    /// Host returned inconsistent or malformed primitive data.
    #[error("Value extraction failed for object {object}: {reason}")]
    ExtractionFailed {
        /// Offending object.
        object: ObjectRef,
        /// What was wrong.
        reason: String,
    },
    /// Object advertised a reduction but neither the reduction nor an opaque blob was usable.
    #[error("Reduction failed for object {object} ({type_name})")]
    ReductionFailed {
        /// Offending object.
        object: ObjectRef,
        /// Host type name.
        type_name: String,
    },
    /// Growing the visited set, work stack or node arena failed.
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),
    /// A host capability call failed.
    #[error("Host error: {0}")]
    Host(String),
}

impl FingerprintError {
    /// Create a host error from any error type.
    pub fn from_host<E: std::error::Error>(e: E) -> Self {
        Self::Host(e.to_string())
    }

    /// Create an allocation failure from a reservation error.
    pub fn from_alloc(e: std::collections::TryReserveError) -> Self {
        Self::AllocationFailure(e.to_string())
    }

    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedShape { .. } => "unsupported_shape",
            Self::ExtractionFailed { .. } => "extraction_failed",
            Self::ReductionFailed { .. } => "reduction_failed",
            Self::AllocationFailure(_) => "allocation_failure",
            Self::Host(_) => "host",
        }
    }

    /// Whether the traversal could continue after this error.
    ///
    /// Always `false`: a fingerprint is all or nothing, and callers treat
    /// a missing fingerprint as "assume changed".
    pub fn is_recoverable(&self) -> bool {
        false
    }
}
