//! Recursive mapping engine
//!
//! [`Mapper`] converts a source value into a destination value by matching
//! structure, not by per-type conversion code. At every recursion step the
//! engine inspects the destination's shape (and, for the wrapper bypass,
//! both shapes) and picks one strategy, in fixed priority order:
//!
//! 1. wrapper bypass for types flagged in the registry
//! 2. identical types: copy the value as-is
//! 3. struct destination: field-by-field walk
//! 4. optional destination: allocate and recurse, or stay empty
//! 5. sequence destination: element-wise mapping, order preserved
//! 6. registered converter, or fail with an unsupported conversion
//!
//! All failures abort the whole `map` call; there is no partial-mapping
//! result, and destination state after an error is unspecified (fields
//! already written stay written). Callers needing all-or-nothing semantics
//! should map into a scratch destination and swap it in on success.
//!
//! The recursion holds no state between calls and never blocks. Unbounded
//! recursive type pairs exhaust the call stack; the engine does not defend
//! against them.
//!
//! Copyright (c) 2025 Remap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::value::{FieldDescriptor, Kind, Resolution, StructValue, TypeDescriptor, Value};

use super::registry::ConverterRegistry;

/// Outcome of the custom-converter path; absence stays internal until the
/// dispatcher decides how to escalate it
enum CustomError {
    NotFound,
    Failed(Error),
}

/// Failure source inside the wrapper bypass: unwrap failures may fall back
/// to a converter, failures inside the unwrapped mapping may not
enum WrapperError {
    Unwrap(Error),
    Mapping(Error),
}

/// Recursive structural mapper owning its converter registry
///
/// A fresh `Mapper` starts with an empty registry: no converters, no
/// wrapper flags. All configuration goes through the registry methods; the
/// engine itself is stateless between calls and safe to share across
/// threads.
#[derive(Debug, Default)]
pub struct Mapper {
    registry: ConverterRegistry,
}

impl Mapper {
    /// Create a mapper with an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry backing this mapper
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Register a converter for the (from, to) identity pair
    pub fn register_converter<F>(&self, from: &str, to: &str, converter: F)
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.registry.register(from, to, converter);
    }

    /// Remove the converter for the pair; no-op when absent
    pub fn unregister_converter(&self, from: &str, to: &str) {
        self.registry.unregister(from, to);
    }

    /// Set or clear the wrapper flag for a type identity
    pub fn set_wrapper_type(&self, identity: &str, wrapper: bool) {
        self.registry.set_wrapper_type(identity, wrapper);
    }

    /// Whether the identity is flagged as a wrapper type
    pub fn is_wrapper_type(&self, identity: &str) -> bool {
        self.registry.is_wrapper_type(identity)
    }

    /// Map `source` into `dest` in place
    ///
    /// With `loose` set, destination fields with no source counterpart are
    /// left at their current value instead of failing. The identical-type
    /// fast path copies by clone; the dynamic value model shares no storage
    /// between source and destination.
    pub fn map(&self, source: &Value, dest: &mut Value, loose: bool) -> Result<()> {
        self.map_values(source, dest, loose)
    }

    /// Map `source` into a fresh zero value of `dest_type` and return it
    pub fn map_into(
        &self,
        source: &Value,
        dest_type: &TypeDescriptor,
        loose: bool,
    ) -> Result<Value> {
        let mut dest = dest_type.zero_value();
        self.map_values(source, &mut dest, loose)?;
        Ok(dest)
    }

    fn map_values(&self, source: &Value, dest: &mut Value, loose: bool) -> Result<()> {
        if self.wrapper_flagged(source) || self.wrapper_flagged(dest) {
            return self.map_via_wrapper(source, dest, loose);
        }
        if source.type_descriptor() == dest.type_descriptor() {
            *dest = source.clone();
            return Ok(());
        }
        match dest.kind() {
            Kind::Struct => self.map_into_struct(source, dest, loose),
            Kind::Optional => self.map_into_optional(source, dest, loose),
            Kind::Sequence => self.map_into_sequence(source, dest, loose),
            Kind::Scalar | Kind::Opaque => self.custom_or_unsupported(source, dest),
        }
    }

    fn wrapper_flagged(&self, value: &Value) -> bool {
        value.kind() == Kind::Struct && self.registry.is_wrapper_type(&value.identity())
    }

    fn map_via_wrapper(&self, source: &Value, dest: &mut Value, loose: bool) -> Result<()> {
        let from = source.identity();
        let to = dest.identity();
        match self.map_wrapper(source, dest, loose) {
            Ok(()) => Ok(()),
            Err(WrapperError::Mapping(err)) => Err(err),
            // unwrap failures get one shot at a registered converter
            Err(WrapperError::Unwrap(cause)) => match self.apply_custom(source, dest) {
                Ok(()) => Ok(()),
                Err(CustomError::NotFound) => Err(Error::WrapperConversion {
                    from,
                    to,
                    source: Box::new(cause),
                }),
                Err(CustomError::Failed(err)) => Err(Error::WrapperConversion {
                    from,
                    to,
                    source: Box::new(err),
                }),
            },
        }
    }

    /// Unwrap wrapper-flagged sides down to their single field, then map
    fn map_wrapper(
        &self,
        source: &Value,
        dest: &mut Value,
        loose: bool,
    ) -> std::result::Result<(), WrapperError> {
        if self.wrapper_flagged(source) {
            if let Value::Struct(src) = source {
                if src.len() != 1 {
                    return Err(WrapperError::Unwrap(Error::TooManyFields {
                        ty: source.identity(),
                    }));
                }
                return self.map_wrapper(src.field(0), dest, loose);
            }
        }
        if self.wrapper_flagged(dest) {
            let ty = dest.identity();
            if let Value::Struct(dst) = dest {
                if dst.len() != 1 {
                    return Err(WrapperError::Unwrap(Error::TooManyFields { ty }));
                }
                return self.map_wrapper(source, dst.field_mut(0), loose);
            }
        }
        self.map_values(source, dest, loose)
            .map_err(WrapperError::Mapping)
    }

    fn map_into_struct(&self, source: &Value, dest: &mut Value, loose: bool) -> Result<()> {
        let zero;
        let source = match source {
            Value::Optional(opt) => match opt.value() {
                Some(inner) => inner,
                None => {
                    // an empty source optional stands in for a zero pointee
                    zero = opt.pointee().zero_value();
                    &zero
                }
            },
            other => other,
        };
        match (source, dest) {
            (Value::Struct(src), Value::Struct(dst)) => {
                let dest_ty = dst.descriptor().clone();
                let source_ty = src.descriptor().clone();
                for (index, field) in dest_ty.fields().iter().enumerate() {
                    self.map_field(source, src, dst.field_mut(index), field, loose)
                        .map_err(|err| Self::annotate_field(err, field, &dest_ty, &source_ty))?;
                }
                Ok(())
            }
            (source, dest) => self.custom_or_unsupported(source, dest),
        }
    }

    /// Map one destination field from whatever the source offers for it
    fn map_field(
        &self,
        source: &Value,
        src: &StructValue,
        dest_field: &mut Value,
        field: &FieldDescriptor,
        loose: bool,
    ) -> Result<()> {
        if field.is_embedded() {
            // an embedded destination field absorbs the whole source
            return self.map_values(source, dest_field, loose);
        }
        match src.descriptor().find_field(field.name()) {
            Some(path) => match src.resolve_path(&path) {
                Resolution::Found(value) => self.map_values(value, dest_field, loose),
                // fields behind an empty embedded optional are skipped outright
                Resolution::NilAncestor => Ok(()),
            },
            None if loose => Ok(()),
            None => self.map_unmatched_field(source, src, dest_field, field, loose),
        }
    }

    /// Strict-mode handling for a destination field with no direct match:
    /// one level of flattening, then one level of un-flattening
    fn map_unmatched_field(
        &self,
        source: &Value,
        src: &StructValue,
        dest_field: &mut Value,
        field: &FieldDescriptor,
        loose: bool,
    ) -> Result<()> {
        if dest_field.kind() == Kind::Struct {
            return self.map_values(source, dest_field, loose);
        }
        let mut candidate: Option<&Value> = None;
        for sub in src.fields() {
            let Value::Struct(sub_struct) = sub else {
                continue;
            };
            let Some(path) = sub_struct.descriptor().find_field(field.name()) else {
                continue;
            };
            let Resolution::Found(value) = sub_struct.resolve_path(&path) else {
                continue;
            };
            if candidate.is_none() {
                candidate = Some(value);
            } else {
                log::warn!(
                    "field {} is ambiguous across sub-structs of {}; keeping the first match",
                    field.name(),
                    src.descriptor()
                );
                break;
            }
        }
        match candidate {
            Some(value) => self.map_values(value, dest_field, loose),
            None => Err(Error::MissingField {
                field: field.name().to_string(),
                source_type: src.descriptor().identity(),
            }),
        }
    }

    fn map_into_optional(&self, source: &Value, dest: &mut Value, loose: bool) -> Result<()> {
        match dest {
            Value::Optional(dst) => {
                // an empty source optional leaves the destination empty
                if matches!(source, Value::Optional(src) if src.is_none()) {
                    return Ok(());
                }
                let mut inner = dst.pointee().zero_value();
                self.map_values(source, &mut inner, loose)?;
                dst.set(inner);
                Ok(())
            }
            dest => self.custom_or_unsupported(source, dest),
        }
    }

    fn map_into_sequence(&self, source: &Value, dest: &mut Value, loose: bool) -> Result<()> {
        match (source, dest) {
            (Value::Sequence(src), Value::Sequence(dst)) => {
                let element = dst.element().clone();
                let mut items = Vec::with_capacity(src.len());
                for item in src.items() {
                    let mut slot = element.zero_value();
                    self.map_values(item, &mut slot, loose)?;
                    items.push(slot);
                }
                if src.is_empty() {
                    self.probe_elements(src.element(), &element, loose)?;
                }
                dst.set_items(items);
                Ok(())
            }
            (source, dest) => self.custom_or_unsupported(source, dest),
        }
    }

    /// A zero-length source still proves the element types line up
    fn probe_elements(
        &self,
        src_element: &TypeDescriptor,
        dest_element: &TypeDescriptor,
        loose: bool,
    ) -> Result<()> {
        let probe = src_element.zero_value();
        let mut scratch = dest_element.zero_value();
        self.map_values(&probe, &mut scratch, loose)
            .map_err(|err| Error::IncompatibleElements {
                from: src_element.identity(),
                to: dest_element.identity(),
                source: Box::new(err),
            })
    }

    fn custom_or_unsupported(&self, source: &Value, dest: &mut Value) -> Result<()> {
        let from = source.identity();
        let to = dest.identity();
        match self.apply_custom(source, dest) {
            Ok(()) => Ok(()),
            Err(CustomError::NotFound) => Err(Error::UnsupportedConversion { from, to }),
            Err(CustomError::Failed(err)) => Err(err),
        }
    }

    /// Invoke the registered converter for the pair, if any, and store its
    /// result in the destination
    fn apply_custom(&self, source: &Value, dest: &mut Value) -> std::result::Result<(), CustomError> {
        let from = source.identity();
        let to = dest.identity();
        let Some(converter) = self.registry.lookup(&from, &to) else {
            return Err(CustomError::NotFound);
        };
        let produced = converter(source).map_err(|err| {
            CustomError::Failed(Error::Converter {
                from: from.clone(),
                to: to.clone(),
                source: err,
            })
        })?;
        if produced.type_descriptor() != dest.type_descriptor() {
            let mismatch = anyhow::anyhow!(
                "converter produced {} where {} was expected",
                produced.identity(),
                to
            );
            return Err(CustomError::Failed(Error::Converter {
                from,
                to,
                source: mismatch,
            }));
        }
        *dest = produced;
        Ok(())
    }

    /// Wrap a field failure with its context, once, at the frame where it
    /// was first caught
    fn annotate_field(
        err: Error,
        field: &FieldDescriptor,
        dest_ty: &TypeDescriptor,
        source_ty: &TypeDescriptor,
    ) -> Error {
        if matches!(err, Error::Field { .. }) {
            return err;
        }
        Error::Field {
            field: field.name().to_string(),
            dest_type: dest_ty.identity(),
            source_type: source_ty.identity(),
            source: Box::new(err),
        }
    }
}
