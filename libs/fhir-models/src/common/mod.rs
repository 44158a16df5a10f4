//! Building blocks shared by all resources
//!
//! Primitive types, general-purpose data types, choice values and errors.

pub mod datatypes;
pub mod error;
pub mod primitive;
pub mod value;

// Re-export commonly used types
pub use datatypes::*;
pub use error::{ConversionError, Error, Result};
pub use primitive::*;
pub use value::AnyValue;
