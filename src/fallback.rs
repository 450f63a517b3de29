//! Generic fallback for objects with no built-in shape.
//!
//! Decision order:
//!
//! 1. Runtime bookkeeping types are skipped entirely
//! 2. Objects without a reduction protocol fold their opaque blob
//! 3. A terminal reduction folds as a byte string
//! 4. A component reduction recurses into components `1..`
//! 5. An unusable reduction falls back to the opaque blob
//!
//! The fallback only decides; the visitor does the folding.

use crate::host::{HostObjectModel, Reduction};
use crate::types::{FingerprintError, ObjectRef};

/// What the visitor should do with an unclassified object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackPlan {
    /// Not observable state; fold nothing.
    Skip,
    /// Fold as a terminal byte string.
    Terminal {
        /// Host type name.
        type_name: String,
        /// Reduced bytes.
        bytes: Vec<u8>,
    },
    /// Register, then recurse into the components.
    Components {
        /// Host type name.
        type_name: String,
        /// Components to visit, reconstructor marker already dropped.
        items: Vec<ObjectRef>,
        /// Whether identity is part of this object's state.
        identity_relevant: bool,
    },
    /// Register and fold the opaque serialized form.
    Blob {
        /// Host type name.
        type_name: String,
        /// Serialized bytes.
        bytes: Vec<u8>,
    },
}

/// Decide how to fold an object that matched no shape predicate.
pub fn plan_fallback<H: HostObjectModel>(host: &H, object: ObjectRef) -> Result<FallbackPlan, FingerprintError> {
    if host.is_runtime_bookkeeping(object) {
        tracing::trace!(object = %object, "skipping runtime bookkeeping object");
        return Ok(FallbackPlan::Skip);
    }

    let type_name = host.type_name(object).map_err(FingerprintError::from_host)?;

    if !host.supports_reduction(object).map_err(FingerprintError::from_host)? {
        return match host.serialize_opaque(object).map_err(FingerprintError::from_host)? {
            Some(bytes) => Ok(FallbackPlan::Blob { type_name, bytes }),
            None => Err(FingerprintError::UnsupportedShape { object, type_name }),
        };
    }

    match host.reduce(object).map_err(FingerprintError::from_host)? {
        Reduction::Terminal(bytes) => Ok(FallbackPlan::Terminal { type_name, bytes }),
        Reduction::Components(mut items) => {
            // index 0 is the reconstructor
            if !items.is_empty() {
                items.remove(0);
            }
            Ok(FallbackPlan::Components {
                type_name,
                items,
                identity_relevant: !host.is_identity_irrelevant(object),
            })
        }
        Reduction::Unavailable => {
            tracing::trace!(object = %object, type_name = %type_name, "reduction unavailable, trying opaque form");
            match host.serialize_opaque(object).map_err(FingerprintError::from_host)? {
                Some(bytes) => Ok(FallbackPlan::Blob { type_name, bytes }),
                None => Err(FingerprintError::ReductionFailed { object, type_name }),
            }
        }
    }
}
