//! Error types for FHIR models

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Invalid primitive value: {0}")]
    Conversion(#[from] ConversionError),
}

/// Failure to turn a wire scalar into a typed primitive value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("expected a {expected} token, found {found}")]
    WrongToken {
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{value}' is not a valid {type_name}")]
    InvalidLexical {
        type_name: &'static str,
        value: String,
    },

    #[error("{value} is out of range for {type_name}")]
    OutOfRange {
        type_name: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
