// Central Error Type for the command model

use thiserror::Error;

/// Error surfaced by the explicit (non-absorbing) entry points
///
/// The soft terminal operations (`text`, `lines`, `execute`) never return
/// this; they fold every variant into an empty value.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Spec error: {0}")]
    Spec(#[from] crate::domain::SpecError),

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),

    #[error("Command was never constructed (null result)")]
    NullCommand,
}

/// Result type alias using CommandError
pub type Result<T> = std::result::Result<T, CommandError>;
