//! Error types for schema loading and code generation

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations
pub type GenResult<T> = Result<T, GenerateError>;

/// Error type for generator operations
///
/// Every variant is fatal: generation is deterministic, so the same input
/// would fail the same way on a retry.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Two definitions resolved to the same constructor tag
    #[error("duplicate constructor id {id:#010x}: `{first}` and `{second}`")]
    DuplicateConstructor {
        id: u32,
        first: String,
        second: String,
    },

    /// A flagged argument names an indicator the definition does not have
    #[error("`{definition}`: argument `{argument}` references unknown flag indicator `{indicator}`")]
    UnknownFlagIndicator {
        definition: String,
        argument: String,
        indicator: String,
    },

    /// A flagged argument appears before the indicator it references
    #[error("`{definition}`: argument `{argument}` precedes its flag indicator `{indicator}`")]
    FlagBeforeIndicator {
        definition: String,
        argument: String,
        indicator: String,
    },

    /// More than one `#` argument in a single definition
    #[error("`{definition}`: more than one flag indicator (`{first}`, `{second}`)")]
    MultipleFlagIndicators {
        definition: String,
        first: String,
        second: String,
    },

    /// The result family of a definition was never collected
    #[error("`{definition}`: result type `{family}` is not a registered abstract type")]
    UnregisteredAbstract { definition: String, family: String },

    /// A flagged constructor parameter precedes a required one
    #[error("`{definition}`: flagged parameter `{flagged}` precedes required parameter `{required}`")]
    ParameterOrder {
        definition: String,
        flagged: String,
        required: String,
    },

    /// A bare type reference that names no known constructor
    #[error("`{definition}`: bare type `{name}` does not name a known constructor")]
    UnknownBareType { definition: String, name: String },

    /// A schema construct the generator cannot express
    #[error("`{definition}`: unsupported schema construct: {detail}")]
    Unsupported { definition: String, detail: String },

    /// A schema record that cannot be parsed
    #[error("{source_name}:{line}: malformed schema record: {reason}")]
    MalformedSchema {
        source_name: String,
        line: usize,
        reason: String,
    },

    /// Filesystem failure
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Generator bug (e.g. unbalanced output blocks)
    #[error("internal error: {0}")]
    Internal(String),
}

impl GenerateError {
    /// Returns a stable code for this error, used as the CLI exit status
    pub fn error_code(&self) -> u8 {
        match self {
            GenerateError::DuplicateConstructor { .. } => 2,
            GenerateError::UnknownFlagIndicator { .. } => 3,
            GenerateError::FlagBeforeIndicator { .. } => 4,
            GenerateError::MultipleFlagIndicators { .. } => 5,
            GenerateError::UnregisteredAbstract { .. } => 6,
            GenerateError::ParameterOrder { .. } => 7,
            GenerateError::UnknownBareType { .. } => 8,
            GenerateError::Unsupported { .. } => 9,
            GenerateError::MalformedSchema { .. } => 10,
            GenerateError::Io { .. } => 11,
            GenerateError::Config(_) => 12,
            GenerateError::Internal(_) => 13,
        }
    }

    /// Whether the error comes from the schema contents rather than the environment
    pub fn is_schema_error(&self) -> bool {
        !matches!(
            self,
            GenerateError::Io { .. } | GenerateError::Config(_) | GenerateError::Internal(_)
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "error/error_tests.rs"]
mod error_tests;
