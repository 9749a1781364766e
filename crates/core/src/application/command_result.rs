// Command Result - deferred execution handle with pipe + cache composition

use std::fmt;
use std::ops::BitOr;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::application::CommandRunner;
use crate::domain::execution_result::split_lines;
use crate::domain::{ExecutionOptions, ExecutionResult, Pipeline};
use crate::error::{CommandError, Result};
use crate::port::{CancellationToken, ExecutionError};

/// Handle over a command (or pipeline) that has not run yet
///
/// Nothing executes until one of the terminal operations is awaited:
/// [`text`](Self::text), [`lines`](Self::lines), [`execute`](Self::execute)
/// or [`try_execute`](Self::try_execute).
///
/// The soft terminal operations never fail. A command that could not be
/// built, could not be started, was cancelled, or failed strict validation
/// looks exactly like a command that ran and printed nothing. This merger is
/// intentional and mirrors an unresolvable command typed at a shell; callers
/// that need the reason use `try_execute`.
pub struct CommandResult {
    target: Option<Target>,
    caching: bool,
    memo: OnceCell<ExecutionResult>,
}

struct Target {
    runner: CommandRunner,
    pipeline: Pipeline,
}

impl CommandResult {
    pub(crate) fn new(runner: CommandRunner, pipeline: Pipeline) -> Self {
        Self::from_parts(Some(Target { runner, pipeline }), false)
    }

    /// Null result: every terminal operation answers with an empty value
    pub fn null() -> Self {
        Self::from_parts(None, false)
    }

    fn from_parts(target: Option<Target>, caching: bool) -> Self {
        Self {
            target,
            caching,
            memo: OnceCell::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }

    pub fn is_cached(&self) -> bool {
        self.caching
    }

    pub fn pipeline(&self) -> Option<&Pipeline> {
        self.target.as_ref().map(|target| &target.pipeline)
    }

    // ------------------------------------------------------------------
    // Composition (never executes)
    // ------------------------------------------------------------------

    /// Feed this result's stdout into a new downstream stage
    ///
    /// The upstream caching flag carries over. A null upstream or an invalid
    /// downstream yields the null result.
    pub fn pipe<I, S>(&self, executable: &str, arguments: I) -> CommandResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pipe_with(executable, arguments, Some(ExecutionOptions::default()))
    }

    pub fn pipe_with<I, S>(
        &self,
        executable: &str,
        arguments: I,
        options: Option<ExecutionOptions>,
    ) -> CommandResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(target) = &self.target else {
            return CommandResult::null();
        };
        match target.runner.build_spec(executable, arguments, options) {
            Some(next) => Self::from_parts(
                Some(Target {
                    runner: target.runner.clone(),
                    pipeline: target.pipeline.then(next),
                }),
                self.caching,
            ),
            None => CommandResult::null(),
        }
    }

    /// Append every stage of `downstream` after this result's stages
    pub fn pipe_into(&self, downstream: &CommandResult) -> CommandResult {
        let (Some(upstream), Some(next)) = (&self.target, &downstream.target) else {
            return CommandResult::null();
        };
        let pipeline = next
            .pipeline
            .stages()
            .iter()
            .fold(upstream.pipeline.clone(), |pipeline, stage| pipeline.then(stage.clone()));
        Self::from_parts(
            Some(Target {
                runner: upstream.runner.clone(),
                pipeline,
            }),
            self.caching,
        )
    }

    /// Same command with at-most-once execution for the returned instance
    ///
    /// The cache belongs to the new instance only; no two results ever share
    /// a memoized value.
    pub fn cached(&self) -> CommandResult {
        let target = self.target.as_ref().map(|target| Target {
            runner: target.runner.clone(),
            pipeline: target.pipeline.clone(),
        });
        Self::from_parts(target, true)
    }

    // ------------------------------------------------------------------
    // Terminal operations
    // ------------------------------------------------------------------

    /// Captured stdout verbatim, or `""` on any failure
    pub async fn text(&self, cancel: &CancellationToken) -> String {
        self.execute(cancel).await.stdout
    }

    /// Stdout split on `\n`/`\r` without empty lines, or `[]` on any failure
    pub async fn lines(&self, cancel: &CancellationToken) -> Vec<String> {
        split_lines(&self.text(cancel).await)
    }

    /// Full result, or the zero-valued result on any failure
    pub async fn execute(&self, cancel: &CancellationToken) -> ExecutionResult {
        match self.try_execute(cancel).await {
            Ok(result) => result,
            Err(e) => {
                match &e {
                    CommandError::NullCommand
                    | CommandError::Execution(ExecutionError::Cancelled) => {
                        debug!(command = %self, error = %e, "No output (absorbed)")
                    }
                    _ => {
                        warn!(command = %self, error = %e, "Command failed, returning empty result")
                    }
                }
                ExecutionResult::default()
            }
        }
    }

    /// Like [`execute`](Self::execute) but reports why nothing came back
    ///
    /// # Errors
    /// - CommandError::NullCommand for the null result
    /// - CommandError::Execution for launch failures, cancellation and
    ///   strict-validation failures
    pub async fn try_execute(&self, cancel: &CancellationToken) -> Result<ExecutionResult> {
        let Some(target) = &self.target else {
            return Err(CommandError::NullCommand);
        };
        if cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled.into());
        }

        if !self.caching {
            return Ok(target.launch(cancel).await?);
        }

        if self.memo.initialized() {
            debug!(command = %target.pipeline, "Cache hit");
        }
        let result = self
            .memo
            .get_or_try_init(|| target.launch(cancel))
            .await?;
        Ok(result.clone())
    }
}

impl Target {
    async fn launch(
        &self,
        cancel: &CancellationToken,
    ) -> std::result::Result<ExecutionResult, ExecutionError> {
        self.runner.launcher().launch(&self.pipeline, cancel).await
    }
}

impl Default for CommandResult {
    fn default() -> Self {
        Self::null()
    }
}

impl BitOr<&CommandResult> for &CommandResult {
    type Output = CommandResult;

    fn bitor(self, downstream: &CommandResult) -> CommandResult {
        self.pipe_into(downstream)
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{}", target.pipeline),
            None => write!(f, "<null>"),
        }
    }
}

impl fmt::Debug for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandResult")
            .field("pipeline", &self.pipeline())
            .field("caching", &self.caching)
            .field("executed", &self.memo.initialized())
            .finish()
    }
}
