// Application Layer - Command construction, composition and execution

pub mod command_result;
pub mod runner;
pub mod tool;

// Re-exports
pub use command_result::CommandResult;
pub use runner::CommandRunner;
pub use tool::ToolCommand;
