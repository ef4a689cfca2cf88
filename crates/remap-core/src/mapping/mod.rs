//! Structural mapping: the engine and its converter registry
//!
//! # Module Organization
//!
//! - [`engine`] - the recursive mapping engine, [`Mapper`]
//! - [`registry`] - converter and wrapper-flag storage, [`ConverterRegistry`]
//!
//! The registry is consulted by the engine at exactly two decision points
//! (the wrapper-type test and the custom-converter lookup) and never calls
//! back into the engine.
//!
//! Copyright (c) 2025 Remap Team
//! Licensed under the Apache-2.0 license

pub mod engine;
pub mod registry;

pub use engine::Mapper;
pub use registry::{ConverterFn, ConverterKey, ConverterRegistry};
