//! Dynamic values carrying their own runtime type information
//!
//! The mapping engine operates on [`Value`], a tagged representation of
//! runtime-shaped data: scalars, opaque foreign values, structs, optionals,
//! and sequences. Every value can report the [`TypeDescriptor`] it was built
//! against, which is what the engine dispatches on.
//!
//! Composite values are constructed through validating constructors
//! ([`Value::structure`], [`Value::some`], [`Value::sequence`], ...) so a
//! value that exists is always coherent with its descriptor. Construction
//! failures are the programming-error tier of the failure taxonomy; the
//! engine never has to re-check coherence mid-recursion.
//!
//! Copyright (c) 2025 Remap Team
//! Licensed under the Apache-2.0 license

pub mod descriptor;

pub use descriptor::{FieldDescriptor, Kind, ScalarKind, TypeDescriptor};

use crate::error::{Error, Result};

/// A named foreign value the engine treats as a leaf
///
/// The payload is an arbitrary JSON document; the engine never inspects it,
/// it only copies it whole or hands it to a registered converter.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueValue {
    pub(crate) ty: TypeDescriptor,
    pub(crate) data: serde_json::Value,
}

impl OpaqueValue {
    /// Descriptor of the opaque type
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// The opaque payload
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }
}

/// A struct value: a descriptor plus one value per declared field
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub(crate) ty: TypeDescriptor,
    pub(crate) fields: Vec<Value>,
}

/// Outcome of walking an index path through a struct value
pub(crate) enum Resolution<'a> {
    /// The field exists and holds this value
    Found(&'a Value),
    /// The path crosses an empty embedded optional
    NilAncestor,
}

impl StructValue {
    /// Descriptor of the struct type
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the struct has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field values in declaration order
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    /// Field value at `index`; panics when out of bounds
    pub fn field(&self, index: usize) -> &Value {
        &self.fields[index]
    }

    pub(crate) fn field_mut(&mut self, index: usize) -> &mut Value {
        &mut self.fields[index]
    }

    /// Promoted field lookup by name, resolving through embedded structs
    ///
    /// Returns `None` both when no field of that name exists and when the
    /// field sits behind an empty embedded optional.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let path = self.ty.find_field(name)?;
        match self.resolve_path(&path) {
            Resolution::Found(value) => Some(value),
            Resolution::NilAncestor => None,
        }
    }

    /// Walk an index path produced by [`TypeDescriptor::find_field`],
    /// dereferencing intermediate optionals along the way
    pub(crate) fn resolve_path(&self, path: &[usize]) -> Resolution<'_> {
        let mut current = &self.fields[path[0]];
        for &index in &path[1..] {
            loop {
                match current {
                    Value::Optional(opt) => match opt.value() {
                        Some(inner) => current = inner,
                        None => return Resolution::NilAncestor,
                    },
                    _ => break,
                }
            }
            match current {
                Value::Struct(inner) => current = &inner.fields[index],
                _ => return Resolution::NilAncestor,
            }
        }
        Resolution::Found(current)
    }
}

/// An optional value: empty, or one pointee
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalValue {
    pub(crate) pointee: TypeDescriptor,
    pub(crate) value: Option<Box<Value>>,
}

impl OptionalValue {
    /// Descriptor of the pointee type
    pub fn pointee(&self) -> &TypeDescriptor {
        &self.pointee
    }

    /// The contained value, if any
    pub fn value(&self) -> Option<&Value> {
        self.value.as_deref()
    }

    /// Whether the optional is empty
    pub fn is_none(&self) -> bool {
        self.value.is_none()
    }

    pub(crate) fn set(&mut self, value: Value) {
        self.value = Some(Box::new(value));
    }
}

/// An ordered sequence of same-typed elements
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceValue {
    pub(crate) element: TypeDescriptor,
    pub(crate) items: Vec<Value>,
}

impl SequenceValue {
    /// Descriptor of the element type
    pub fn element(&self) -> &TypeDescriptor {
        &self.element
    }

    /// Elements in order
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence has no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn set_items(&mut self, items: Vec<Value>) {
        self.items = items;
    }
}

/// A dynamic value, the unit the mapping engine recurses over
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Opaque(OpaqueValue),
    Struct(StructValue),
    Optional(OptionalValue),
    Sequence(SequenceValue),
}

impl Value {
    /// Build a struct value against `ty`, validating arity and field types
    pub fn structure(ty: &TypeDescriptor, fields: Vec<Value>) -> Result<Value> {
        if ty.kind() != Kind::Struct {
            return Err(Error::invalid_value(format!(
                "{} is not a struct type",
                ty.identity()
            )));
        }
        let declared = ty.fields();
        if declared.len() != fields.len() {
            return Err(Error::invalid_value(format!(
                "{} declares {} fields, got {}",
                ty.identity(),
                declared.len(),
                fields.len()
            )));
        }
        for (descriptor, value) in declared.iter().zip(&fields) {
            if value.type_descriptor() != *descriptor.ty() {
                return Err(Error::invalid_value(format!(
                    "field {} of {} expects {}, got {}",
                    descriptor.name(),
                    ty.identity(),
                    descriptor.ty().identity(),
                    value.identity()
                )));
            }
        }
        Ok(Value::Struct(StructValue {
            ty: ty.clone(),
            fields,
        }))
    }

    /// Build a populated optional of type `ty` (an optional descriptor)
    pub fn some(ty: &TypeDescriptor, value: Value) -> Result<Value> {
        let Some(pointee) = ty.pointee() else {
            return Err(Error::invalid_value(format!(
                "{} is not an optional type",
                ty.identity()
            )));
        };
        if value.type_descriptor() != *pointee {
            return Err(Error::invalid_value(format!(
                "{} expects pointee {}, got {}",
                ty.identity(),
                pointee.identity(),
                value.identity()
            )));
        }
        Ok(Value::Optional(OptionalValue {
            pointee: pointee.clone(),
            value: Some(Box::new(value)),
        }))
    }

    /// Build an empty optional of type `ty` (an optional descriptor)
    pub fn none(ty: &TypeDescriptor) -> Result<Value> {
        let Some(pointee) = ty.pointee() else {
            return Err(Error::invalid_value(format!(
                "{} is not an optional type",
                ty.identity()
            )));
        };
        Ok(Value::Optional(OptionalValue {
            pointee: pointee.clone(),
            value: None,
        }))
    }

    /// Build a sequence of type `ty` (a sequence descriptor)
    pub fn sequence(ty: &TypeDescriptor, items: Vec<Value>) -> Result<Value> {
        let Some(element) = ty.element() else {
            return Err(Error::invalid_value(format!(
                "{} is not a sequence type",
                ty.identity()
            )));
        };
        for item in &items {
            if item.type_descriptor() != *element {
                return Err(Error::invalid_value(format!(
                    "{} expects elements of {}, got {}",
                    ty.identity(),
                    element.identity(),
                    item.identity()
                )));
            }
        }
        Ok(Value::Sequence(SequenceValue {
            element: element.clone(),
            items,
        }))
    }

    /// Build an opaque value of a named foreign type
    pub fn opaque(name: impl Into<String>, data: serde_json::Value) -> Value {
        Value::Opaque(OpaqueValue {
            ty: TypeDescriptor::opaque(name),
            data,
        })
    }

    /// Shape category of this value's type
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_)
            | Value::Int(_)
            | Value::Uint(_)
            | Value::Float(_)
            | Value::String(_)
            | Value::Bytes(_) => Kind::Scalar,
            Value::Opaque(_) => Kind::Opaque,
            Value::Struct(_) => Kind::Struct,
            Value::Optional(_) => Kind::Optional,
            Value::Sequence(_) => Kind::Sequence,
        }
    }

    /// Descriptor of this value's type
    pub fn type_descriptor(&self) -> TypeDescriptor {
        match self {
            Value::Bool(_) => TypeDescriptor::scalar(ScalarKind::Bool),
            Value::Int(_) => TypeDescriptor::scalar(ScalarKind::Int),
            Value::Uint(_) => TypeDescriptor::scalar(ScalarKind::Uint),
            Value::Float(_) => TypeDescriptor::scalar(ScalarKind::Float),
            Value::String(_) => TypeDescriptor::scalar(ScalarKind::String),
            Value::Bytes(_) => TypeDescriptor::scalar(ScalarKind::Bytes),
            Value::Opaque(opaque) => opaque.ty.clone(),
            Value::Struct(s) => s.ty.clone(),
            Value::Optional(opt) => TypeDescriptor::optional(opt.pointee.clone()),
            Value::Sequence(seq) => TypeDescriptor::sequence(seq.element.clone()),
        }
    }

    /// Identity string of this value's type
    pub fn identity(&self) -> String {
        self.type_descriptor().identity()
    }

    /// Borrow as a struct value
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as an optional value
    pub fn as_optional(&self) -> Option<&OptionalValue> {
        match self {
            Value::Optional(opt) => Some(opt),
            _ => None,
        }
    }

    /// Borrow as a sequence value
    pub fn as_sequence(&self) -> Option<&SequenceValue> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }
}
