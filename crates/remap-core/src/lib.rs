//! Remap Core - recursive structural mapping for runtime-shaped values
//!
//! This crate converts a value of one runtime-determined shape into a value
//! of another shape by recursively matching structure: identical types copy,
//! structs map field by field, optionals and sequences map through, flagged
//! single-field wrapper types unwrap transparently, and registered
//! converters bridge everything else. Callers describe shapes with
//! [`TypeDescriptor`]s and carry data in [`Value`]s; no per-type conversion
//! code is written.
//!
//! # Main Components
//!
//! - **Error Handling**: failure taxonomy using `thiserror`, with converter
//!   payloads carried by `anyhow`
//! - **Value Model**: [`TypeDescriptor`] and [`Value`], the introspection
//!   layer the engine dispatches on
//! - **Converter Registry**: thread-safe store of converters and
//!   wrapper-type flags
//! - **Mapping Engine**: the recursive [`Mapper`]
//!
//! # Example
//!
//! ```no_run
//! use remap_core::{FieldDescriptor, Mapper, Result, ScalarKind, TypeDescriptor, Value};
//!
//! fn example() -> Result<()> {
//!     let source_ty = TypeDescriptor::structure(
//!         "Source",
//!         vec![
//!             FieldDescriptor::new("Foo", TypeDescriptor::scalar(ScalarKind::Int)),
//!             FieldDescriptor::new("Bar", TypeDescriptor::scalar(ScalarKind::String)),
//!         ],
//!     );
//!     let dest_ty = TypeDescriptor::structure(
//!         "Dest",
//!         vec![
//!             FieldDescriptor::new("Foo", TypeDescriptor::scalar(ScalarKind::Int)),
//!             FieldDescriptor::new("Bar", TypeDescriptor::scalar(ScalarKind::String)),
//!         ],
//!     );
//!
//!     let source = Value::structure(
//!         &source_ty,
//!         vec![Value::Int(1), Value::String("bar".to_string())],
//!     )?;
//!     let mapper = Mapper::new();
//!     let dest = mapper.map_into(&source, &dest_ty, false)?;
//!     assert_eq!(dest.as_struct().unwrap().get("Bar"), source.as_struct().unwrap().get("Bar"));
//!     Ok(())
//! }
//! ```
//!
//! Copyright (c) 2025 Remap Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod mapping;
pub mod value;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use mapping::{ConverterFn, ConverterKey, ConverterRegistry, Mapper};
pub use value::{
    FieldDescriptor, Kind, OpaqueValue, OptionalValue, ScalarKind, SequenceValue, StructValue,
    TypeDescriptor, Value,
};

use std::sync::OnceLock;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static DEFAULT_MAPPER: OnceLock<Mapper> = OnceLock::new();

/// The process-wide default mapper backing the free-function surface
///
/// Created lazily before first use and never torn down. The engine itself
/// carries no global state; this instance exists purely as a composition
/// convenience for callers that want one shared registry.
pub fn default_mapper() -> &'static Mapper {
    DEFAULT_MAPPER.get_or_init(Mapper::new)
}

/// Map `source` into `dest` using the default mapper
pub fn map(source: &Value, dest: &mut Value, loose: bool) -> Result<()> {
    default_mapper().map(source, dest, loose)
}

/// Map `source` into a fresh value of `dest_type` using the default mapper
pub fn map_into(source: &Value, dest_type: &TypeDescriptor, loose: bool) -> Result<Value> {
    default_mapper().map_into(source, dest_type, loose)
}

/// Register a converter on the default mapper
pub fn register_converter<F>(from: &str, to: &str, converter: F)
where
    F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    default_mapper().register_converter(from, to, converter);
}

/// Remove a converter from the default mapper; no-op when absent
pub fn unregister_converter(from: &str, to: &str) {
    default_mapper().unregister_converter(from, to);
}

/// Set or clear a wrapper flag on the default mapper
pub fn set_wrapper_type(identity: &str, wrapper: bool) {
    default_mapper().set_wrapper_type(identity, wrapper);
}
