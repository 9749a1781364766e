// `cmdflow run` - compose the command line, launch it once, render the outcome

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use tabled::{Table, Tabled};
use tracing::{debug, warn};

use cmdflow_core::domain::{ExecutionOptions, ExecutionResult};
use cmdflow_core::port::ExecutionError;
use cmdflow_core::{CancellationToken, CommandError, CommandResult, CommandRunner};

use crate::config;

/// Exit code reported when a stage could not be started
const EXIT_SPAWN_FAILED: i32 = 127;
/// Exit code reported after an interrupt
const EXIT_CANCELLED: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Stdout verbatim
    Text,
    /// Non-empty stdout lines
    Lines,
    /// Full result as JSON
    Json,
    /// Result table
    Summary,
}

#[derive(Tabled)]
struct SummaryRow {
    command: String,
    exit_code: i32,
    success: String,
    duration_ms: u128,
    stdout_lines: usize,
    stderr_bytes: usize,
}

/// What one `run` invocation writes and exits with
#[derive(Debug)]
pub struct RunOutcome {
    pub result: ExecutionResult,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Compose the command line into a (possibly piped) command result
pub fn compose(
    runner: &CommandRunner,
    arguments: &[String],
    options: &ExecutionOptions,
) -> CommandResult {
    let mut stages = config::split_stages(arguments).into_iter();
    let Some(first) = stages.next() else {
        return CommandResult::null();
    };

    let (program, args) = split_program(&first);
    let mut command = runner.run_with(program, args.iter().cloned(), Some(options.clone()));
    for stage in stages {
        let (program, args) = split_program(&stage);
        command = command.pipe_with(program, args.iter().cloned(), Some(options.clone()));
    }
    command
}

fn split_program(stage: &[String]) -> (&str, &[String]) {
    stage
        .split_first()
        .map_or(("", &[][..]), |(program, args)| (program.as_str(), args))
}

/// Launch `command` exactly once and render the outcome for `output`
///
/// Every view is derived from the single launch; a failed launch is never
/// retried to produce another view.
pub async fn run(
    command: &CommandResult,
    output: OutputMode,
    cancel: &CancellationToken,
) -> Result<RunOutcome> {
    let (result, exit_code) = match command.try_execute(cancel).await {
        Ok(result) => {
            let exit_code = result.exit_code;
            (result, exit_code)
        }
        Err(e) => {
            let exit_code = failure_exit_code(&e);
            match &e {
                CommandError::NullCommand => debug!("Null command, nothing ran"),
                _ => warn!(command = %command, error = %e, "Command failed"),
            }
            (ExecutionResult::default(), exit_code)
        }
    };

    let (stdout, stderr) = match output {
        OutputMode::Text => (result.stdout.clone(), result.stderr.clone()),
        OutputMode::Lines => {
            let stdout = result.lines().into_iter().map(|line| line + "\n").collect();
            (stdout, result.stderr.clone())
        }
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(&result)?;
            (format!("{}\n", json), String::new())
        }
        OutputMode::Summary => (format!("{}\n", summary_table(command, &result)), String::new()),
    };

    Ok(RunOutcome {
        result,
        exit_code,
        stdout,
        stderr,
    })
}

fn failure_exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::NullCommand | CommandError::Spec(_) => 0,
        CommandError::Execution(ExecutionError::NonZeroExit { exit_code, .. }) => *exit_code,
        CommandError::Execution(ExecutionError::SpawnFailed { .. }) => EXIT_SPAWN_FAILED,
        CommandError::Execution(ExecutionError::Cancelled) => EXIT_CANCELLED,
        CommandError::Execution(ExecutionError::Io(_)) => 1,
    }
}

fn summary_table(command: &CommandResult, result: &ExecutionResult) -> Table {
    let success = if result.is_success() {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    };
    let row = SummaryRow {
        command: command.to_string(),
        exit_code: result.exit_code,
        success,
        duration_ms: result.elapsed().as_millis(),
        stdout_lines: result.lines().len(),
        stderr_bytes: result.stderr.len(),
    };
    Table::new(vec![row])
}
