// Domain Error Types

use thiserror::Error;

/// Reasons a command description cannot be built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("Executable name is blank")]
    BlankExecutable,

    #[error("Interior NUL byte in {0:?}")]
    NulByte(String),
}

pub type Result<T> = std::result::Result<T, SpecError>;
