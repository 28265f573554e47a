//! Mapping error taxonomy.
//!
//! # Responsibility
//! - Give every registry, dispatch and validation failure a semantic variant.
//! - Keep failures synchronous: errors are returned at the call site.
//!
//! # Invariants
//! - Lookup failures are never retried internally.
//! - Batch failures always wrap the first failing element.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type MappingResult<T> = Result<T, MappingError>;

/// Errors raised by registration, dispatch and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// Registry lookup yielded no converter.
    NoConverterFound {
        source_type: &'static str,
        target_type: Option<&'static str>,
    },
    /// Input declares neither transfer nor storage capability.
    UnsupportedInput(&'static str),
    /// Input declares both capabilities, so the direction is unknown.
    AmbiguousInputType(&'static str),
    /// A converter already exists for this type pair.
    DuplicateConverter {
        transfer_type: &'static str,
        storage_type: &'static str,
    },
    /// Fail-hard validation rule violated.
    InvalidField { field: String, message: String },
    /// Soft validation failed while the engine rejects invalid input.
    ValidationFailed(&'static str),
    /// First failure inside a bulk operation.
    BatchElement {
        index: usize,
        source: Box<MappingError>,
    },
    /// Discovery scope identifier is malformed.
    InvalidScope(String),
    /// Converter returned or received a value of an unexpected type.
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Converter handle outlived its owning mapper.
    EngineUnavailable,
    /// Failure reported by a converter implementation.
    Conversion {
        converter: &'static str,
        message: String,
    },
}

impl MappingError {
    /// Builds a converter-level failure.
    pub fn conversion(converter: &'static str, message: impl Into<String>) -> Self {
        Self::Conversion {
            converter,
            message: message.into(),
        }
    }

    /// Returns the innermost error for batch failures.
    pub fn root(&self) -> &MappingError {
        match self {
            Self::BatchElement { source, .. } => source.root(),
            other => other,
        }
    }
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoConverterFound {
                source_type,
                target_type: Some(target),
            } => write!(f, "no converter found: {source_type} -> {target}"),
            Self::NoConverterFound {
                source_type,
                target_type: None,
            } => write!(f, "no converter found for {source_type}"),
            Self::UnsupportedInput(value) => write!(
                f,
                "{value} is neither a transfer object nor a storage object"
            ),
            Self::AmbiguousInputType(value) => write!(
                f,
                "{value} is both a transfer object and a storage object"
            ),
            Self::DuplicateConverter {
                transfer_type,
                storage_type,
            } => write!(
                f,
                "converter already registered for {transfer_type} <-> {storage_type}"
            ),
            Self::InvalidField { field, message } => {
                write!(f, "invalid field `{field}`: {message}")
            }
            Self::ValidationFailed(value) => write!(f, "validation failed for {value}"),
            Self::BatchElement { index, source } => {
                write!(f, "batch element {index} failed: {source}")
            }
            Self::InvalidScope(value) => write!(f, "discovery scope is invalid: `{value}`"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {expected}, got {actual}")
            }
            Self::EngineUnavailable => write!(f, "mapper was dropped before converter call"),
            Self::Conversion { converter, message } => {
                write!(f, "converter {converter} failed: {message}")
            }
        }
    }
}

impl Error for MappingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BatchElement { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
