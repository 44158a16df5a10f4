//! Decode and encode errors

use helix_models::ConversionError;
use thiserror::Error;

/// Failure of a decode or encode call.
///
/// Decode variants carry the enclosing record kind and the field path
/// (`Patient.name[0].given[1]`) of the offending token.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{kind}: malformed {path}: expected {expected}, found {found}")]
    MalformedToken {
        kind: &'static str,
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("{kind}: unknown field '{field}' at {path}")]
    UnknownField {
        kind: &'static str,
        path: String,
        field: String,
    },

    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("{kind}: invalid value at {path}: {source}")]
    TypeConversion {
        kind: &'static str,
        path: String,
        source: ConversionError,
    },

    #[error("{kind}: more than one type given for choice field {path}")]
    ConflictingChoice { kind: &'static str, path: String },

    #[error("expected a JSON object for the resource")]
    ExpectedObject,

    #[error("missing resourceType property")]
    MissingResourceType,

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("XML event error: {0}")]
    XmlEvent(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FormatError>;

/// Position of the decoder inside a record, used to build error context.
#[derive(Debug, Clone)]
pub(crate) struct Location {
    pub kind: &'static str,
    pub path: String,
}

impl Location {
    pub fn new(kind: &'static str, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Location of a field inside the current element.
    pub fn field(&self, name: &str) -> Self {
        Self::new(self.kind, format!("{}.{}", self.path, name))
    }

    /// Location of a list entry.
    pub fn index(&self, index: usize) -> Self {
        Self::new(self.kind, format!("{}[{}]", self.path, index))
    }

    /// Location inside a nested element of a different kind.
    pub fn enter(&self, kind: &'static str) -> Self {
        Self::new(kind, self.path.clone())
    }

    pub fn malformed(&self, expected: &'static str, found: impl Into<String>) -> FormatError {
        FormatError::MalformedToken {
            kind: self.kind,
            path: self.path.clone(),
            expected,
            found: found.into(),
        }
    }

    pub fn unknown_field(&self, field: impl Into<String>) -> FormatError {
        FormatError::UnknownField {
            kind: self.kind,
            path: self.path.clone(),
            field: field.into(),
        }
    }

    pub fn conversion(&self, source: ConversionError) -> FormatError {
        FormatError::TypeConversion {
            kind: self.kind,
            path: self.path.clone(),
            source,
        }
    }

    pub fn conflicting_choice(&self) -> FormatError {
        FormatError::ConflictingChoice {
            kind: self.kind,
            path: self.path.clone(),
        }
    }
}
