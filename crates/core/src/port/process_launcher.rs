// Process Launcher Port
// Abstraction over the OS process-spawning primitive

use crate::domain::{ExecutionResult, Pipeline};
use crate::port::CancellationToken;
use async_trait::async_trait;
use thiserror::Error;

/// Launch errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Spawn failed for {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Execution cancelled")]
    Cancelled,

    #[error("{program} exited with code {exit_code}")]
    NonZeroExit { program: String, exit_code: i32 },
}

/// Process Launcher trait
///
/// Implementations:
/// - TokioProcessLauncher: spawns real OS processes (cmdflow-infra-system)
/// - MockProcessLauncher: scripted results for tests
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Launch every stage of `pipeline`, wiring stage stdout to the next
    /// stage's stdin, and buffer the final output
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if any stage cannot be started
    /// - ExecutionError::Cancelled if `cancel` fires before output is read
    /// - ExecutionError::NonZeroExit if a strict stage exits non-zero
    async fn launch(
        &self,
        pipeline: &Pipeline,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    /// Mock launcher behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Succeed with this stdout
        Output(String),
        /// Succeed with stdout `"<launch number>\n"`, different on every launch
        Counter,
        /// Succeed with a non-zero exit code
        Exit { code: i32, stderr: String },
        /// Always fail with this error
        Fail(ExecutionError),
        /// Block until the token is cancelled
        Hang,
    }

    /// Mock Process Launcher for testing
    pub struct MockProcessLauncher {
        behavior: Arc<Mutex<MockBehavior>>,
        launched: Arc<Mutex<Vec<String>>>,
    }

    impl MockProcessLauncher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                launched: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_output(stdout: impl Into<String>) -> Self {
            Self::new(MockBehavior::Output(stdout.into()))
        }

        pub fn new_counter() -> Self {
            Self::new(MockBehavior::Counter)
        }

        pub fn new_fail(error: ExecutionError) -> Self {
            Self::new(MockBehavior::Fail(error))
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            self.launched.lock().unwrap().len()
        }

        /// Rendered pipelines in launch order
        pub fn launched(&self) -> Vec<String> {
            self.launched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessLauncher for MockProcessLauncher {
        async fn launch(
            &self,
            pipeline: &Pipeline,
            cancel: &CancellationToken,
        ) -> Result<ExecutionResult, ExecutionError> {
            if cancel.is_cancelled() {
                return Err(ExecutionError::Cancelled);
            }

            let count = {
                let mut launched = self.launched.lock().unwrap();
                launched.push(pipeline.to_string());
                launched.len()
            };
            let behavior = self.behavior.lock().unwrap().clone();
            let start_time = Utc::now();

            let (exit_code, stdout, stderr) = match behavior {
                MockBehavior::Output(stdout) => (0, stdout, String::new()),
                MockBehavior::Counter => (0, format!("{}\n", count), String::new()),
                MockBehavior::Exit { code, stderr } => (code, String::new(), stderr),
                MockBehavior::Fail(error) => return Err(error),
                MockBehavior::Hang => {
                    cancel.cancelled().await;
                    return Err(ExecutionError::Cancelled);
                }
            };

            Ok(ExecutionResult {
                exit_code,
                start_time,
                end_time: Utc::now(),
                stdout,
                stderr,
            })
        }
    }
}
