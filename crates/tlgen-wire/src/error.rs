//! Error types for the reference codec

use thiserror::Error;
use tlgen_core::GenerateError;

/// Result type alias for codec operations
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised while encoding or decoding TL data
#[derive(Error, Debug)]
pub enum WireError {
    /// Input ended before a value was complete
    #[error("unexpected end of input at offset {offset}: {needed} more byte(s) needed")]
    UnexpectedEof { offset: usize, needed: usize },

    /// A tag that no registered definition carries
    #[error("unknown constructor {0:#010x}")]
    UnknownConstructor(u32),

    /// A registered tag read where a different family was expected
    #[error("constructor {tag:#010x} (`{found}`) is not a `{expected}`")]
    UnexpectedConstructor {
        tag: u32,
        found: String,
        expected: String,
    },

    /// A `Bool` slot holding neither boolTrue nor boolFalse
    #[error("invalid Bool constructor {0:#010x}")]
    InvalidBool(u32),

    /// A value whose shape does not fit the argument type
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A required field missing from an object being encoded
    #[error("`{definition}` is missing required field `{field}`")]
    MissingField { definition: String, field: String },

    /// Two registered definitions share a tag
    #[error("duplicate constructor id {id:#010x}: `{first}` and `{second}`")]
    DuplicateConstructor {
        id: u32,
        first: String,
        second: String,
    },

    /// A `string` argument holding bytes that are not UTF-8
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    /// A byte-string length that cannot be encoded or was malformed
    #[error("invalid byte string length: {0}")]
    InvalidLength(String),

    /// Bytes left after a complete top-level object
    #[error("{0} trailing byte(s) after object")]
    TrailingBytes(usize),

    /// Objects nested past the decoder's limit
    #[error("objects nested deeper than {limit}")]
    TooDeep { limit: usize },

    /// Failure inside one field, with the enclosing definition
    #[error("`{definition}.{field}`: {source}")]
    InField {
        definition: String,
        field: String,
        #[source]
        source: Box<WireError>,
    },

    /// Schema loading or validation failed
    #[error(transparent)]
    Schema(#[from] GenerateError),
}

impl WireError {
    /// Stable numeric code, continuing after the generator's codes
    pub fn error_code(&self) -> u8 {
        match self {
            WireError::Schema(e) => e.error_code(),
            WireError::UnexpectedEof { .. } => 20,
            WireError::UnknownConstructor(_) => 21,
            WireError::UnexpectedConstructor { .. } => 22,
            WireError::InvalidBool(_) => 23,
            WireError::TypeMismatch { .. } => 24,
            WireError::MissingField { .. } => 25,
            WireError::DuplicateConstructor { .. } => 26,
            WireError::InvalidUtf8 { .. } => 27,
            WireError::InvalidLength(_) => 28,
            WireError::TrailingBytes(_) => 29,
            WireError::TooDeep { .. } => 30,
            WireError::InField { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, past any field context
    pub fn root_cause(&self) -> &WireError {
        match self {
            WireError::InField { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn in_field(self, definition: &str, field: &str) -> Self {
        WireError::InField {
            definition: definition.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        WireError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "error/error_tests.rs"]
mod error_tests;
