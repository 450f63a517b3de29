//! Shape classification for host objects.

use serde::{Deserialize, Serialize};

/// Structural kind of a host object.
///
/// Exactly one tag applies to an object at dispatch time. The discriminant
/// is the tag byte folded into digests and must never be renumbered: doing
/// so changes every fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShapeTag {
    /// The null sentinel.
    None = 0,
    /// The not-implemented sentinel.
    NotImplemented = 1,
    /// The ellipsis sentinel.
    Ellipsis = 2,
    /// Fixed-width integer.
    Integer = 3,
    /// IEEE-754 double.
    Float = 4,
    /// Boolean.
    Boolean = 5,
    /// UTF-8 text.
    Text = 6,
    /// Immutable byte string.
    Bytes = 7,
    /// Mutable byte buffer.
    ByteBuffer = 8,
    /// Ordered sequence (tuple, list).
    Sequence = 9,
    /// Unordered set.
    Set = 10,
    /// Key/value mapping.
    Mapping = 11,
    /// A type object.
    TypeDescriptor = 12,
    /// A callable (function, method, closure).
    Callable = 13,
    /// Anything else, handled by the generic fallback.
    OpaqueCustom = 14,
}

impl ShapeTag {
    /// Precedence used when classifying through shape predicates.
    ///
    /// Sentinels and primitives come first. `OpaqueCustom` is never matched by
    /// predicate; it is what remains when nothing here matches.
    pub const DISPATCH_ORDER: [ShapeTag; 14] = [
        ShapeTag::None,
        ShapeTag::NotImplemented,
        ShapeTag::Ellipsis,
        ShapeTag::Boolean,
        ShapeTag::Integer,
        ShapeTag::Float,
        ShapeTag::Text,
        ShapeTag::Sequence,
        ShapeTag::Set,
        ShapeTag::Mapping,
        ShapeTag::Bytes,
        ShapeTag::ByteBuffer,
        ShapeTag::TypeDescriptor,
        ShapeTag::Callable,
    ];

    /// Tag byte folded into the digest.
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Terminal shapes carry a value and are never recursed into.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::None
                | Self::NotImplemented
                | Self::Ellipsis
                | Self::Integer
                | Self::Float
                | Self::Boolean
                | Self::Text
                | Self::Bytes
                | Self::ByteBuffer
                | Self::TypeDescriptor
        )
    }

    /// Whether objects of this shape are tracked in the visited set.
    pub const fn tracks_sharing(self) -> bool {
        !self.is_terminal()
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::NotImplemented => "not_implemented",
            Self::Ellipsis => "ellipsis",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::ByteBuffer => "byte_buffer",
            Self::Sequence => "sequence",
            Self::Set => "set",
            Self::Mapping => "mapping",
            Self::TypeDescriptor => "type_descriptor",
            Self::Callable => "callable",
            Self::OpaqueCustom => "opaque_custom",
        }
    }
}

impl std::fmt::Display for ShapeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
