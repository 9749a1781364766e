// Process launcher implementation
// reason: tokio::process for async spawn + pipe wiring, futures for joining stages
use async_trait::async_trait;
use futures::future::join_all;
use std::io;
use std::process::{Output, Stdio};
use std::sync::Arc;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use cmdflow_core::domain::{ExecutionResult, LaunchConfig, Pipeline, ResultValidation};
use cmdflow_core::port::{
    CancellationToken, ExecutionError, IdProvider, ProcessLauncher, TimeProvider,
};

/// Exit code reported for a stage terminated by a signal
const SIGNALLED_EXIT_CODE: i32 = -1;

/// One spawned pipeline stage
struct Stage {
    config: LaunchConfig,
    child: Child,
}

/// Spawns real OS processes with tokio
///
/// Every stage gets piped stdout/stderr; stage i stdout becomes stage i+1
/// stdin and the first stage reads from null. No shell is involved.
pub struct TokioProcessLauncher {
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
}

impl TokioProcessLauncher {
    /// Create a new process launcher
    ///
    /// # Arguments
    /// * `time_provider` - Clock for start/end timestamps
    /// * `id_provider` - Execution IDs for log correlation
    ///
    /// # Example
    /// ```ignore
    /// let launcher = TokioProcessLauncher::new(
    ///     Arc::new(SystemTimeProvider),
    ///     Arc::new(UuidProvider),
    /// );
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>, id_provider: Arc<dyn IdProvider>) -> Self {
        Self {
            time_provider,
            id_provider,
        }
    }

    /// Translate a launch configuration into a tokio command
    fn build_command(config: &LaunchConfig) -> Command {
        let mut command = Command::new(&config.program);
        command.args(&config.arguments);

        if let Some(dir) = &config.working_directory {
            command.current_dir(dir);
        }
        // Overlay on the inherited environment, never replace it
        for (key, value) in &config.environment {
            match value {
                Some(value) => command.env(key, value),
                None => command.env_remove(key),
            };
        }

        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        command
    }

    /// Spawn every stage, handing each stdout to the next stage's stdin
    fn spawn_stages(pipeline: &Pipeline) -> Result<Vec<Stage>, ExecutionError> {
        let last = pipeline.len().saturating_sub(1);
        let mut stages = Vec::with_capacity(pipeline.len());
        let mut upstream: Option<Stdio> = None;

        for (index, spec) in pipeline.stages().iter().enumerate() {
            let config = spec.launch_config();
            let mut command = Self::build_command(&config);
            command.stdin(upstream.take().unwrap_or_else(Stdio::null));

            let mut child = command.spawn().map_err(|e| ExecutionError::SpawnFailed {
                program: config.program.clone(),
                message: e.to_string(),
            })?;
            debug!(program = %config.program, pid = ?child.id(), stage = index, "Stage spawned");

            if index < last {
                let stdout = child.stdout.take().ok_or_else(|| {
                    ExecutionError::Io(format!("stdout of {} was not captured", config.program))
                })?;
                let stdio: Stdio = stdout
                    .try_into()
                    .map_err(|e: io::Error| ExecutionError::Io(e.to_string()))?;
                upstream = Some(stdio);
            }

            stages.push(Stage { config, child });
        }

        Ok(stages)
    }

    /// Wait for all stages together so no pipe fills up while another blocks
    async fn wait_stages(
        stages: Vec<Stage>,
        cancel: &CancellationToken,
    ) -> Result<Vec<(LaunchConfig, io::Result<Output>)>, ExecutionError> {
        let waits = stages.into_iter().map(|stage| async move {
            let output = stage.child.wait_with_output().await;
            (stage.config, output)
        });

        tokio::select! {
            outputs = join_all(waits) => Ok(outputs),
            _ = cancel.cancelled() => Err(ExecutionError::Cancelled),
        }
    }

    /// Fold stage outputs: stdout and exit code of the last stage, stderr of all
    fn collect_output(
        outputs: Vec<(LaunchConfig, io::Result<Output>)>,
    ) -> Result<(i32, String, String), ExecutionError> {
        let last = outputs.len().saturating_sub(1);
        let mut exit_code = 0;
        let mut stdout = String::new();
        let mut stderr = String::new();

        for (index, (config, output)) in outputs.into_iter().enumerate() {
            let output = output.map_err(|e| ExecutionError::Io(e.to_string()))?;
            let code = output.status.code().unwrap_or(SIGNALLED_EXIT_CODE);

            if config.validation == ResultValidation::Strict && !output.status.success() {
                return Err(ExecutionError::NonZeroExit {
                    program: config.program,
                    exit_code: code,
                });
            }

            stderr.push_str(&String::from_utf8_lossy(&output.stderr));
            if index == last {
                exit_code = code;
                stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            }
        }

        Ok((exit_code, stdout, stderr))
    }
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    async fn launch(
        &self,
        pipeline: &Pipeline,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, ExecutionError> {
        if cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled);
        }

        let execution_id = self.id_provider.generate_id();
        let start_time = self.time_provider.now();

        info!(
            execution_id = %execution_id,
            command = %pipeline,
            stages = pipeline.len(),
            "Starting process execution"
        );

        let outcome = match Self::spawn_stages(pipeline) {
            Ok(stages) => Self::wait_stages(stages, cancel).await,
            Err(e) => Err(e),
        };
        let outputs = match outcome {
            Ok(outputs) => outputs,
            Err(e) => {
                warn!(execution_id = %execution_id, error = %e, "Process execution aborted");
                return Err(e);
            }
        };
        let (exit_code, stdout, stderr) = Self::collect_output(outputs)?;
        let end_time = self.time_provider.now();

        let result = ExecutionResult {
            exit_code,
            start_time,
            end_time,
            stdout,
            stderr,
        };

        info!(
            execution_id = %execution_id,
            exit_code = exit_code,
            duration_ms = %result.elapsed().as_millis(),
            "Process execution completed"
        );

        Ok(result)
    }
}
