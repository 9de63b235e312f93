//! Error types for schema synthesis.
//!
//! Only conditions that must abort an API-description build are errors.
//! Recoverable annotation problems (missing properties, malformed examples
//! or bounds) are logged and skipped instead.

use thiserror::Error;

/// Errors that can occur while deriving schemas or assembling responses.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A response was declared without a type to document.
    #[error("response type cannot be absent")]
    MissingResponseType,

    /// The legacy error helper accepts at most one error type.
    #[error("expected at most one error type, got {0}")]
    TooManyErrorTypes(usize),

    /// Two distinct types resolved to the same schema name.
    #[error("schema name '{name}' is already registered for {existing}, cannot register {incoming}")]
    NameCollision {
        /// Schema name both types map to.
        name: String,
        /// Identity of the type already registered.
        existing: String,
        /// Identity of the type that was rejected.
        incoming: String,
    },

    /// A real type tried to claim a name reserved for placeholders.
    #[error("schema name '{0}' is reserved")]
    ReservedName(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
