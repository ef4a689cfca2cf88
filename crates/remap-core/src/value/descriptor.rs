//! Runtime type descriptors for dynamic values
//!
//! A [`TypeDescriptor`] is the introspection handle the mapping engine
//! dispatches on: it reports a type's shape category, its field list for
//! structs (with embedding information), its element or pointee type for
//! sequences and optionals, and a stable identity string usable as a
//! registry key. Descriptors are immutable and cheap to clone (Arc-backed),
//! and two descriptors compare equal exactly when they describe the same
//! shape under the same names.
//!
//! Identity strings follow fixed conventions: structs and opaque types use
//! their declared name, optionals are `*T`, sequences are `[]T`, and scalars
//! use their kind name. Registry lookups match these strings exactly; no
//! supertype or subtype matching is performed.
//!
//! Copyright (c) 2025 Remap Team
//! Licensed under the Apache-2.0 license

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Value;

/// Scalar type categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Bytes,
}

impl ScalarKind {
    /// Identity segment for this scalar kind
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Uint => "uint",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape category of a type, the property the engine dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    /// Plain scalar (bool, int, uint, float, string, bytes)
    Scalar,
    /// Named foreign type the engine cannot look inside
    Opaque,
    /// Named product type with a field list
    Struct,
    /// Pointer-like type that is either empty or holds one pointee
    Optional,
    /// Ordered homogeneous collection
    Sequence,
}

/// A single struct field: name, type, and embedding flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    ty: TypeDescriptor,
    embedded: bool,
}

impl FieldDescriptor {
    /// Create a named field
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            embedded: false,
        }
    }

    /// Create an embedded field, named after its type
    ///
    /// An embedded optional takes the name of its pointee.
    pub fn embedded(ty: TypeDescriptor) -> Self {
        Self {
            name: ty.embedded_name(),
            ty,
            embedded: true,
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Whether the field is embedded rather than declared by name
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }
}

#[derive(Debug, PartialEq, Eq)]
enum TypeShape {
    Scalar(ScalarKind),
    Opaque { name: String },
    Struct { name: String, fields: Vec<FieldDescriptor> },
    Optional { pointee: TypeDescriptor },
    Sequence { element: TypeDescriptor },
}

/// Immutable handle describing a runtime type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    shape: Arc<TypeShape>,
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shape, &other.shape) || self.shape == other.shape
    }
}

impl Eq for TypeDescriptor {}

impl TypeDescriptor {
    fn from_shape(shape: TypeShape) -> Self {
        Self {
            shape: Arc::new(shape),
        }
    }

    /// Descriptor for a scalar kind
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::from_shape(TypeShape::Scalar(kind))
    }

    /// Descriptor for a named foreign type the engine treats as a leaf
    pub fn opaque(name: impl Into<String>) -> Self {
        Self::from_shape(TypeShape::Opaque { name: name.into() })
    }

    /// Descriptor for a named struct with the given fields
    pub fn structure(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::from_shape(TypeShape::Struct {
            name: name.into(),
            fields,
        })
    }

    /// Descriptor for an optional (pointer-like) type
    pub fn optional(pointee: TypeDescriptor) -> Self {
        Self::from_shape(TypeShape::Optional { pointee })
    }

    /// Descriptor for a sequence of the given element type
    pub fn sequence(element: TypeDescriptor) -> Self {
        Self::from_shape(TypeShape::Sequence { element })
    }

    /// Shape category of this type
    pub fn kind(&self) -> Kind {
        match &*self.shape {
            TypeShape::Scalar(_) => Kind::Scalar,
            TypeShape::Opaque { .. } => Kind::Opaque,
            TypeShape::Struct { .. } => Kind::Struct,
            TypeShape::Optional { .. } => Kind::Optional,
            TypeShape::Sequence { .. } => Kind::Sequence,
        }
    }

    /// Stable identity string, used as the registry key
    pub fn identity(&self) -> String {
        match &*self.shape {
            TypeShape::Scalar(kind) => kind.name().to_string(),
            TypeShape::Opaque { name } => name.clone(),
            TypeShape::Struct { name, .. } => name.clone(),
            TypeShape::Optional { pointee } => format!("*{}", pointee.identity()),
            TypeShape::Sequence { element } => format!("[]{}", element.identity()),
        }
    }

    /// Scalar kind for scalar types
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match &*self.shape {
            TypeShape::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Field list for struct types; empty for every other shape
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &*self.shape {
            TypeShape::Struct { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Field descriptor at `index`, if this is a struct with enough fields
    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields().get(index)
    }

    /// Element type for sequences
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match &*self.shape {
            TypeShape::Sequence { element } => Some(element),
            _ => None,
        }
    }

    /// Pointee type for optionals
    pub fn pointee(&self) -> Option<&TypeDescriptor> {
        match &*self.shape {
            TypeShape::Optional { pointee } => Some(pointee),
            _ => None,
        }
    }

    /// The zero value of this type
    ///
    /// Scalars zero to false/0/0.0/empty, opaque types to a null payload,
    /// structs to all-zero fields, optionals to empty, sequences to empty.
    pub fn zero_value(&self) -> Value {
        match &*self.shape {
            TypeShape::Scalar(ScalarKind::Bool) => Value::Bool(false),
            TypeShape::Scalar(ScalarKind::Int) => Value::Int(0),
            TypeShape::Scalar(ScalarKind::Uint) => Value::Uint(0),
            TypeShape::Scalar(ScalarKind::Float) => Value::Float(0.0),
            TypeShape::Scalar(ScalarKind::String) => Value::String(String::new()),
            TypeShape::Scalar(ScalarKind::Bytes) => Value::Bytes(Vec::new()),
            TypeShape::Opaque { .. } => Value::Opaque(super::OpaqueValue {
                ty: self.clone(),
                data: serde_json::Value::Null,
            }),
            TypeShape::Struct { fields, .. } => Value::Struct(super::StructValue {
                ty: self.clone(),
                fields: fields.iter().map(|f| f.ty().zero_value()).collect(),
            }),
            TypeShape::Optional { pointee } => Value::Optional(super::OptionalValue {
                pointee: pointee.clone(),
                value: None,
            }),
            TypeShape::Sequence { element } => Value::Sequence(super::SequenceValue {
                element: element.clone(),
                items: Vec::new(),
            }),
        }
    }

    /// Promoted field lookup by exact name
    ///
    /// Searches this struct's fields, then the fields of embedded structs
    /// (looking through embedded optionals to their pointee), breadth-first
    /// by embedding depth. The shallowest match wins; two matches at the
    /// same depth are ambiguous and report no match. The returned index path
    /// locates the field from the root, one index per embedding level.
    pub fn find_field(&self, name: &str) -> Option<Vec<usize>> {
        if self.kind() != Kind::Struct {
            return None;
        }
        let mut frontier: Vec<(TypeDescriptor, Vec<usize>)> = vec![(self.clone(), Vec::new())];
        while !frontier.is_empty() {
            let mut matches: Vec<Vec<usize>> = Vec::new();
            let mut next: Vec<(TypeDescriptor, Vec<usize>)> = Vec::new();
            for (ty, path) in &frontier {
                for (index, field) in ty.fields().iter().enumerate() {
                    let mut field_path = path.clone();
                    field_path.push(index);
                    if field.name() == name {
                        matches.push(field_path.clone());
                    }
                    if field.is_embedded() {
                        if let Some(inner) = field.ty().embedded_struct() {
                            next.push((inner, field_path));
                        }
                    }
                }
            }
            match matches.len() {
                0 => {}
                1 => return matches.pop(),
                // same-depth collision: ambiguous, no match
                _ => return None,
            }
            frontier = next;
        }
        None
    }

    /// The struct reachable by embedding through this type, if any
    fn embedded_struct(&self) -> Option<TypeDescriptor> {
        match &*self.shape {
            TypeShape::Struct { .. } => Some(self.clone()),
            TypeShape::Optional { pointee } => match &*pointee.shape {
                TypeShape::Struct { .. } => Some(pointee.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Name an embedded field of this type receives
    fn embedded_name(&self) -> String {
        match &*self.shape {
            TypeShape::Optional { pointee } => pointee.embedded_name(),
            _ => self.identity(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity())
    }
}
