// cmdflow Core - Command Model & Ports
// NO process spawning here (see cmdflow-infra-system)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{CommandResult, CommandRunner, ToolCommand};
pub use domain::{
    CommandSpec, ExecutableOverrides, ExecutionOptions, ExecutionResult, Pipeline,
    ResultValidation,
};
pub use error::{CommandError, Result};
pub use port::{cancellation_channel, CancellationSource, CancellationToken, ProcessLauncher};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
