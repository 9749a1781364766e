// Port Layer - Interfaces for external dependencies

pub mod cancellation;
pub mod id_provider; // For deterministic testing
pub mod process_launcher;
pub mod time_provider;

// Re-exports
pub use cancellation::{cancellation_channel, CancellationSource, CancellationToken};
pub use id_provider::IdProvider;
pub use process_launcher::{ExecutionError, ProcessLauncher};
pub use time_provider::TimeProvider;
