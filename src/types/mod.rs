//! Core types for the fingerprint kernel.

pub mod object_ref;
pub mod shape;
pub mod options;
pub mod error;

pub use object_ref::ObjectRef;
pub use shape::ShapeTag;
pub use options::{FingerprintOptions, TraversalContext, TraversalMode, HashWidth, ParseHashWidthError};
pub use error::FingerprintError;
