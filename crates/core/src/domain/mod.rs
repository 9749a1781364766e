// Domain Layer - Immutable command descriptions and their values

pub mod command_spec;
pub mod error;
pub mod execution_result;
pub mod options;
pub mod overrides;

// Re-exports
pub use command_spec::{CommandSpec, CommandSpecBuilder, Pipeline};
pub use error::SpecError;
pub use execution_result::ExecutionResult;
pub use options::{ExecutionOptions, LaunchConfig, ResultValidation};
pub use overrides::ExecutableOverrides;
