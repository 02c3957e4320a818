//! System-layer error types and conversions.

use grove_core::error::GroveError;

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("`{program}` exited with {code:?}: {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl From<SystemError> for GroveError {
    fn from(err: SystemError) -> Self {
        match err {
            SystemError::CommandFailed {
                program,
                code,
                stderr,
            } => GroveError::CommandFailed {
                program,
                code,
                stderr,
            },
            other => GroveError::System(other.to_string()),
        }
    }
}
