//! Error types for the Remap core library
//!
//! This module defines the failure taxonomy for mapping operations, using
//! thiserror for ergonomic error definitions and anyhow for the flexible
//! error payloads carried by user-supplied converters.
//!
//! Failures fall into two tiers. Construction errors ([`Error::InvalidValue`])
//! indicate a malformed value handed to the library, and surface before any
//! mapping takes place. Every other variant is a shape-mismatch failure
//! discovered during recursion; any of them aborts the entire `map` call with
//! no partial result. Destination state after a failed call is unspecified:
//! fields written before the failure remain written.
//!
//! Copyright (c) 2025 Remap Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Main error type for mapping operations
#[derive(Error, Debug)]
pub enum Error {
    /// A value was constructed against a descriptor it does not satisfy
    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    /// No structural strategy applies and no converter is registered
    #[error("unsupported conversion from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    /// Strict-mode destination field with no source counterpart
    #[error("missing field {field} on source type {source_type}")]
    MissingField { field: String, source_type: String },

    /// A wrapper-flagged type that does not have exactly one field
    #[error("wrapper type {ty} has too many fields to unwrap")]
    TooManyFields { ty: String },

    /// The element types of an empty sequence pair failed the probe mapping
    #[error("incompatible element types mapping {from} into {to}")]
    IncompatibleElements {
        from: String,
        to: String,
        #[source]
        source: Box<Error>,
    },

    /// The wrapper bypass failed and the converter fallback could not recover
    #[error("failed to convert wrapper type {from} to {to}")]
    WrapperConversion {
        from: String,
        to: String,
        #[source]
        source: Box<Error>,
    },

    /// A registered converter was invoked and failed
    #[error("converter from {from} to {to} failed: {source}")]
    Converter {
        from: String,
        to: String,
        #[source]
        source: anyhow::Error,
    },

    /// Context frame added once, at the field where a failure was first caught
    #[error("error mapping field {field} (destination type {dest_type}, source type {source_type}): {source}")]
    Field {
        field: String,
        dest_type: String,
        source_type: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Shorthand for construction-tier failures
    pub(crate) fn invalid_value(message: impl Into<String>) -> Self {
        Error::InvalidValue {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;
