//! Error types for grove.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroveError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity} with id {id}")]
    AlreadyExists { entity: String, id: String },

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Malformed directory entry {dn}: {reason}")]
    MalformedEntry { dn: String, reason: String },

    #[error("Command `{program}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("System group database error: {0}")]
    System(String),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type GroveResult<T> = Result<T, GroveError>;
