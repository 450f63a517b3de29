//! Host object model capabilities.
//!
//! The kernel never inspects host objects directly. Everything it needs
//! (shape predicates, child enumeration, primitive extraction, reduction,
//! opaque serialization, special-type membership) is requested through
//! `HostObjectModel`. Special-type registries are host state, set up once
//! by the host and consulted through the trait.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::digest::DigestAccumulator;
use crate::types::{ObjectRef, ShapeTag};

/// Canonical value of a terminal object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveValue {
    /// Null sentinel.
    None,
    /// Not-implemented sentinel.
    NotImplemented,
    /// Ellipsis sentinel.
    Ellipsis,
    /// Integer, wide enough for both `i64` and `u64` host values.
    Integer(i128),
    /// Float.
    Float(f64),
    /// Boolean.
    Boolean(bool),
    /// Text.
    Text(String),
    /// Immutable bytes.
    Bytes(Vec<u8>),
    /// Mutable byte buffer contents.
    ByteBuffer(Vec<u8>),
    /// Qualified name of a type object.
    TypeDescriptor(String),
}

impl PrimitiveValue {
    /// Shape this value belongs to.
    pub fn tag(&self) -> ShapeTag {
        match self {
            Self::None => ShapeTag::None,
            Self::NotImplemented => ShapeTag::NotImplemented,
            Self::Ellipsis => ShapeTag::Ellipsis,
            Self::Integer(_) => ShapeTag::Integer,
            Self::Float(_) => ShapeTag::Float,
            Self::Boolean(_) => ShapeTag::Boolean,
            Self::Text(_) => ShapeTag::Text,
            Self::Bytes(_) => ShapeTag::Bytes,
            Self::ByteBuffer(_) => ShapeTag::ByteBuffer,
            Self::TypeDescriptor(_) => ShapeTag::TypeDescriptor,
        }
    }

    /// Fold tag byte plus canonical value bytes.
    pub fn fold_into(&self, acc: &mut DigestAccumulator) {
        acc.fold_tag(self.tag());
        match self {
            Self::None | Self::NotImplemented | Self::Ellipsis => {}
            Self::Integer(v) => acc.update(&v.to_le_bytes()),
            Self::Float(v) => acc.update(&v.to_bits().to_le_bytes()),
            Self::Boolean(v) => acc.fold_byte(u8::from(*v)),
            Self::Text(s) | Self::TypeDescriptor(s) => acc.fold_str(s),
            Self::Bytes(b) | Self::ByteBuffer(b) => acc.fold_len_prefixed(b),
        }
    }

    /// Display form used in identity graphs.
    pub fn display(&self) -> String {
        match self {
            Self::None => "null".to_string(),
            Self::NotImplemented => "not_implemented".to_string(),
            Self::Ellipsis => "...".to_string(),
            Self::Integer(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Boolean(v) => v.to_string(),
            Self::Text(s) => format!("{:?}", s),
            Self::Bytes(b) | Self::ByteBuffer(b) => format!("b[{}]", hex_preview(b)),
            Self::TypeDescriptor(s) => s.clone(),
        }
    }
}

fn hex_preview(bytes: &[u8]) -> String {
    const PREVIEW: usize = 16;
    let mut out: String = bytes.iter().take(PREVIEW).map(|b| format!("{:02x}", b)).collect();
    if bytes.len() > PREVIEW {
        out.push_str(&format!("..+{}", bytes.len() - PREVIEW));
    }
    out
}

/// Result of asking the host to reduce an opaque object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reduction {
    /// Reconstruction components. Index 0 is the reconstructor marker and is
    /// not fingerprinted.
    Components(Vec<ObjectRef>),
    /// The reduction is a single byte-string-like value.
    Terminal(Vec<u8>),
    /// No usable reduction.
    Unavailable,
}

/// Capabilities the kernel consumes from the host object model.
///
/// Implementations must return children in a stable order for unchanged
/// objects. Set and mapping order is folded exactly as returned, so a host
/// whose iteration order varies for equal contents should canonicalize in
/// `elements` / `entries`.
pub trait HostObjectModel {
    /// Error type for host operations.
    type Error: std::error::Error;

    /// Shape predicate.
    fn matches_shape(&self, object: ObjectRef, tag: ShapeTag) -> Result<bool, Self::Error>;

    /// Classify an object. `None` means no built-in shape applies.
    ///
    /// The default scans `ShapeTag::DISPATCH_ORDER` and returns the first
    /// matching predicate. Hosts with a direct classifier may override this
    /// but must agree with that precedence.
    fn classify(&self, object: ObjectRef) -> Result<Option<ShapeTag>, Self::Error> {
        for tag in ShapeTag::DISPATCH_ORDER {
            if self.matches_shape(object, tag)? {
                return Ok(Some(tag));
            }
        }
        Ok(None)
    }

    /// Host type name.
    fn type_name(&self, object: ObjectRef) -> Result<String, Self::Error>;

    /// Extract the value of a terminal object classified as `tag`.
    fn extract(&self, object: ObjectRef, tag: ShapeTag) -> Result<PrimitiveValue, Self::Error>;

    /// Elements of a sequence (index order) or set (iteration order).
    fn elements(&self, object: ObjectRef) -> Result<Vec<ObjectRef>, Self::Error>;

    /// Key/value pairs of a mapping in iteration order.
    fn entries(&self, object: ObjectRef) -> Result<Vec<(ObjectRef, ObjectRef)>, Self::Error>;

    /// Whether the object offers a reduction protocol at all.
    fn supports_reduction(&self, object: ObjectRef) -> Result<bool, Self::Error>;

    /// Reduce an opaque object.
    fn reduce(&self, object: ObjectRef) -> Result<Reduction, Self::Error>;

    /// Opaque serialized form, if the host can produce one.
    fn serialize_opaque(&self, object: ObjectRef) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Value objects whose identity is not part of their state.
    fn is_identity_irrelevant(&self, _object: ObjectRef) -> bool {
        false
    }

    /// Runtime bookkeeping objects that are not user-observable state.
    fn is_runtime_bookkeeping(&self, _object: ObjectRef) -> bool {
        false
    }
}
