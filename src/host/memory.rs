//! In-memory host object model for testing and inspection.
//!
//! Objects live in an arena; an `ObjectRef` token is the arena index plus
//! one. The three sentinels are allocated once at construction and shared,
//! as a real runtime would.

use std::collections::BTreeSet;

use super::{HostObjectModel, PrimitiveValue, Reduction};
use crate::types::{ObjectRef, ShapeTag};

/// Error type for the in-memory host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InMemoryError {
    /// No object with this identity.
    #[error("Unknown object: {0}")]
    UnknownObject(ObjectRef),
    /// Text object holds bytes that are not valid UTF-8.
    #[error("Text object {0} is not valid UTF-8")]
    InvalidText(ObjectRef),
    /// Object does not have the requested shape.
    #[error("Object {object} is not a {expected}")]
    ShapeMismatch {
        /// Object asked about.
        object: ObjectRef,
        /// Shape the caller expected.
        expected: ShapeTag,
    },
}

/// What a custom object's reduction yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomReduction {
    /// `[reconstructor, component...]`.
    Components(Vec<ObjectRef>),
    /// A single byte-string value.
    Terminal(Vec<u8>),
    /// Reduction protocol present but unusable.
    Unavailable,
}

/// One object stored by the in-memory host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostObject {
    /// Null sentinel.
    None,
    /// Not-implemented sentinel.
    NotImplemented,
    /// Ellipsis sentinel.
    Ellipsis,
    /// Integer.
    Int(i128),
    /// Float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Text stored as raw bytes so malformed encodings can be represented.
    Text(Vec<u8>),
    /// Immutable bytes.
    Bytes(Vec<u8>),
    /// Mutable byte buffer.
    ByteArray(Vec<u8>),
    /// Immutable sequence.
    Tuple(Vec<ObjectRef>),
    /// Mutable sequence.
    List(Vec<ObjectRef>),
    /// Set in insertion order.
    Set(Vec<ObjectRef>),
    /// Mapping in insertion order.
    Dict(Vec<(ObjectRef, ObjectRef)>),
    /// Type object.
    Type(String),
    /// Callable with optional serialized code.
    Function {
        /// Function name.
        name: String,
        /// Serialized code, if serializable.
        code: Option<Vec<u8>>,
    },
    /// User-defined object with a reduction protocol.
    Custom {
        /// Type name.
        type_name: String,
        /// Reduction result.
        reduction: CustomReduction,
        /// Opaque serialized form.
        blob: Option<Vec<u8>>,
    },
    /// Object with no reduction protocol.
    Opaque {
        /// Type name.
        type_name: String,
        /// Opaque serialized form.
        blob: Option<Vec<u8>>,
    },
}

impl HostObject {
    fn type_name(&self) -> &str {
        match self {
            Self::None => "null",
            Self::NotImplemented => "not_implemented",
            Self::Ellipsis => "ellipsis",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::ByteArray(_) => "bytearray",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Dict(_) => "dict",
            Self::Type(_) => "type",
            Self::Function { .. } => "function",
            Self::Custom { type_name, .. } | Self::Opaque { type_name, .. } => type_name.as_str(),
        }
    }

    fn has_shape(&self, tag: ShapeTag) -> bool {
        matches!(
            (self, tag),
            (Self::None, ShapeTag::None)
                | (Self::NotImplemented, ShapeTag::NotImplemented)
                | (Self::Ellipsis, ShapeTag::Ellipsis)
                | (Self::Int(_), ShapeTag::Integer)
                | (Self::Float(_), ShapeTag::Float)
                | (Self::Bool(_), ShapeTag::Boolean)
                | (Self::Text(_), ShapeTag::Text)
                | (Self::Bytes(_), ShapeTag::Bytes)
                | (Self::ByteArray(_), ShapeTag::ByteBuffer)
                | (Self::Tuple(_) | Self::List(_), ShapeTag::Sequence)
                | (Self::Set(_), ShapeTag::Set)
                | (Self::Dict(_), ShapeTag::Mapping)
                | (Self::Type(_), ShapeTag::TypeDescriptor)
                | (Self::Function { .. }, ShapeTag::Callable)
        )
    }
}

/// In-memory host object model.
///
/// Special-type registries are configured at construction, the same way a
/// real host resolves them once at start-up.
#[derive(Debug, Clone)]
pub struct InMemoryHost {
    objects: Vec<HostObject>,
    identity_irrelevant_types: BTreeSet<String>,
    bookkeeping_types: BTreeSet<String>,
    none: ObjectRef,
    not_implemented: ObjectRef,
    ellipsis: ObjectRef,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHost {
    /// Create a host holding only the sentinels.
    pub fn new() -> Self {
        let mut host = Self {
            objects: Vec::new(),
            identity_irrelevant_types: BTreeSet::new(),
            bookkeeping_types: BTreeSet::new(),
            none: ObjectRef::new(0),
            not_implemented: ObjectRef::new(0),
            ellipsis: ObjectRef::new(0),
        };
        host.none = host.alloc(HostObject::None);
        host.not_implemented = host.alloc(HostObject::NotImplemented);
        host.ellipsis = host.alloc(HostObject::Ellipsis);
        host
    }

    /// Register a type whose instances are pure values.
    pub fn with_identity_irrelevant_type(mut self, type_name: impl Into<String>) -> Self {
        self.identity_irrelevant_types.insert(type_name.into());
        self
    }

    /// Register a runtime bookkeeping type to skip.
    pub fn with_bookkeeping_type(mut self, type_name: impl Into<String>) -> Self {
        self.bookkeeping_types.insert(type_name.into());
        self
    }

    /// Store an object and return its identity.
    pub fn alloc(&mut self, object: HostObject) -> ObjectRef {
        self.objects.push(object);
        ObjectRef::new(self.objects.len() as u64)
    }

    /// Look up an object.
    pub fn get(&self, object: ObjectRef) -> Result<&HostObject, InMemoryError> {
        let index = object
            .token()
            .checked_sub(1)
            .ok_or(InMemoryError::UnknownObject(object))?;
        self.objects
            .get(index as usize)
            .ok_or(InMemoryError::UnknownObject(object))
    }

    fn get_mut(&mut self, object: ObjectRef) -> Result<&mut HostObject, InMemoryError> {
        let index = object
            .token()
            .checked_sub(1)
            .ok_or(InMemoryError::UnknownObject(object))?;
        self.objects
            .get_mut(index as usize)
            .ok_or(InMemoryError::UnknownObject(object))
    }

    /// Replace an object in place, keeping its identity.
    pub fn replace(&mut self, object: ObjectRef, value: HostObject) -> Result<(), InMemoryError> {
        *self.get_mut(object)? = value;
        Ok(())
    }

    /// Number of stored objects, sentinels included.
    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    /// The null sentinel.
    pub fn none(&self) -> ObjectRef {
        self.none
    }

    /// The not-implemented sentinel.
    pub fn not_implemented(&self) -> ObjectRef {
        self.not_implemented
    }

    /// The ellipsis sentinel.
    pub fn ellipsis(&self) -> ObjectRef {
        self.ellipsis
    }

    /// Allocate an integer.
    pub fn int(&mut self, value: i64) -> ObjectRef {
        self.alloc(HostObject::Int(i128::from(value)))
    }

    /// Allocate a float.
    pub fn float(&mut self, value: f64) -> ObjectRef {
        self.alloc(HostObject::Float(value))
    }

    /// Allocate a boolean.
    pub fn bool(&mut self, value: bool) -> ObjectRef {
        self.alloc(HostObject::Bool(value))
    }

    /// Allocate a text object.
    pub fn text(&mut self, value: &str) -> ObjectRef {
        self.alloc(HostObject::Text(value.as_bytes().to_vec()))
    }

    /// Allocate a list.
    pub fn list(&mut self, items: Vec<ObjectRef>) -> ObjectRef {
        self.alloc(HostObject::List(items))
    }

    /// Allocate a tuple.
    pub fn tuple(&mut self, items: Vec<ObjectRef>) -> ObjectRef {
        self.alloc(HostObject::Tuple(items))
    }

    /// Allocate a set.
    pub fn set(&mut self, items: Vec<ObjectRef>) -> ObjectRef {
        self.alloc(HostObject::Set(items))
    }

    /// Allocate a mapping.
    pub fn dict(&mut self, entries: Vec<(ObjectRef, ObjectRef)>) -> ObjectRef {
        self.alloc(HostObject::Dict(entries))
    }

    /// Append to a list.
    pub fn push(&mut self, list: ObjectRef, item: ObjectRef) -> Result<(), InMemoryError> {
        match self.get_mut(list)? {
            HostObject::List(items) => {
                items.push(item);
                Ok(())
            }
            _ => Err(InMemoryError::ShapeMismatch { object: list, expected: ShapeTag::Sequence }),
        }
    }

    /// Insert or overwrite a mapping entry, keyed by key identity.
    pub fn insert(&mut self, dict: ObjectRef, key: ObjectRef, value: ObjectRef) -> Result<(), InMemoryError> {
        match self.get_mut(dict)? {
            HostObject::Dict(entries) => {
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
                Ok(())
            }
            _ => Err(InMemoryError::ShapeMismatch { object: dict, expected: ShapeTag::Mapping }),
        }
    }

    /// Load a JSON document as host objects.
    ///
    /// Objects become mappings with text keys, arrays become lists, numbers
    /// become integers when they fit in `i64` or `u64` and floats otherwise.
    pub fn load_json(&mut self, value: &serde_json::Value) -> ObjectRef {
        use serde_json::Value;

        match value {
            Value::Null => self.none,
            Value::Bool(b) => self.bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => self.int(i),
                (None, Some(u)) => self.alloc(HostObject::Int(i128::from(u))),
                (None, None) => self.float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => self.text(s),
            Value::Array(items) => {
                let refs = items.iter().map(|item| self.load_json(item)).collect();
                self.list(refs)
            }
            Value::Object(map) => {
                let entries = map
                    .iter()
                    .map(|(k, v)| {
                        let key = self.text(k);
                        (key, self.load_json(v))
                    })
                    .collect();
                self.dict(entries)
            }
        }
    }
}

impl HostObjectModel for InMemoryHost {
    type Error = InMemoryError;

    fn matches_shape(&self, object: ObjectRef, tag: ShapeTag) -> Result<bool, Self::Error> {
        Ok(self.get(object)?.has_shape(tag))
    }

    fn type_name(&self, object: ObjectRef) -> Result<String, Self::Error> {
        Ok(self.get(object)?.type_name().to_string())
    }

    fn extract(&self, object: ObjectRef, tag: ShapeTag) -> Result<PrimitiveValue, Self::Error> {
        let stored = self.get(object)?;
        if !stored.has_shape(tag) {
            return Err(InMemoryError::ShapeMismatch { object, expected: tag });
        }
        let value = match stored {
            HostObject::None => PrimitiveValue::None,
            HostObject::NotImplemented => PrimitiveValue::NotImplemented,
            HostObject::Ellipsis => PrimitiveValue::Ellipsis,
            HostObject::Int(v) => PrimitiveValue::Integer(*v),
            HostObject::Float(v) => PrimitiveValue::Float(*v),
            HostObject::Bool(v) => PrimitiveValue::Boolean(*v),
            HostObject::Text(raw) => {
                let s = String::from_utf8(raw.clone()).map_err(|_| InMemoryError::InvalidText(object))?;
                PrimitiveValue::Text(s)
            }
            HostObject::Bytes(b) => PrimitiveValue::Bytes(b.clone()),
            HostObject::ByteArray(b) => PrimitiveValue::ByteBuffer(b.clone()),
            HostObject::Type(name) => PrimitiveValue::TypeDescriptor(name.clone()),
            _ => return Err(InMemoryError::ShapeMismatch { object, expected: tag }),
        };
        Ok(value)
    }

    fn elements(&self, object: ObjectRef) -> Result<Vec<ObjectRef>, Self::Error> {
        match self.get(object)? {
            HostObject::Tuple(items) | HostObject::List(items) | HostObject::Set(items) => Ok(items.clone()),
            _ => Err(InMemoryError::ShapeMismatch { object, expected: ShapeTag::Sequence }),
        }
    }

    fn entries(&self, object: ObjectRef) -> Result<Vec<(ObjectRef, ObjectRef)>, Self::Error> {
        match self.get(object)? {
            HostObject::Dict(entries) => Ok(entries.clone()),
            _ => Err(InMemoryError::ShapeMismatch { object, expected: ShapeTag::Mapping }),
        }
    }

    fn supports_reduction(&self, object: ObjectRef) -> Result<bool, Self::Error> {
        Ok(matches!(self.get(object)?, HostObject::Custom { .. }))
    }

    fn reduce(&self, object: ObjectRef) -> Result<Reduction, Self::Error> {
        Ok(match self.get(object)? {
            HostObject::Custom { reduction, .. } => match reduction {
                CustomReduction::Components(items) => Reduction::Components(items.clone()),
                CustomReduction::Terminal(bytes) => Reduction::Terminal(bytes.clone()),
                CustomReduction::Unavailable => Reduction::Unavailable,
            },
            _ => Reduction::Unavailable,
        })
    }

    fn serialize_opaque(&self, object: ObjectRef) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(match self.get(object)? {
            HostObject::Function { code, .. } => code.clone(),
            HostObject::Custom { blob, .. } | HostObject::Opaque { blob, .. } => blob.clone(),
            _ => None,
        })
    }

    fn is_identity_irrelevant(&self, object: ObjectRef) -> bool {
        self.get(object)
            .map(|o| self.identity_irrelevant_types.contains(o.type_name()))
            .unwrap_or(false)
    }

    fn is_runtime_bookkeeping(&self, object: ObjectRef) -> bool {
        self.get(object)
            .map(|o| self.bookkeeping_types.contains(o.type_name()))
            .unwrap_or(false)
    }
}
