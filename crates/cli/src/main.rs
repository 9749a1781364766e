//! cmdflow CLI - run commands and pipelines through the cmdflow core
//!
//! Stages are separated by a standalone `|` argument (quote it in your shell):
//!
//! ```text
//! cmdflow run -- printf 'a\nb\nc\nb' '|' grep b '|' wc -l
//! ```

mod config;
mod run;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tabled::{Table, Tabled};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cmdflow_core::port::id_provider::UuidProvider;
use cmdflow_core::port::time_provider::SystemTimeProvider;
use cmdflow_core::{cancellation_channel, CommandRunner};
use cmdflow_infra_system::TokioProcessLauncher;

use crate::run::OutputMode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "cmdflow")]
#[command(about = "Run commands and stdout->stdin pipelines", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Executable override NAME=PATH (repeatable)
    #[arg(long = "override", global = true, env = "CMDFLOW_OVERRIDES", value_delimiter = ';')]
    overrides: Vec<String>,

    /// Log output format
    #[arg(
        long,
        global = true,
        env = "CMDFLOW_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command or pipeline
    Run {
        /// Working directory for every stage
        #[arg(long)]
        cwd: Option<String>,

        /// Environment variable KEY=VALUE (repeatable)
        #[arg(short, long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Remove an inherited environment variable (repeatable)
        #[arg(long, value_name = "KEY")]
        unset: Vec<String>,

        /// Treat a non-zero exit code as failure (no output)
        #[arg(long)]
        strict: bool,

        /// How to print the result
        #[arg(short, long, value_enum, default_value_t = OutputMode::Text)]
        output: OutputMode,

        /// Program and arguments; a standalone `|` starts the next stage
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Show the executable override table
    Overrides,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Tabled)]
struct OverrideRow {
    name: String,
    path: String,
}

fn init_logging(format: LogFormat) {
    // Logs go to stderr; stdout only carries process output
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cmdflow=warn"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    info!("cmdflow v{} starting", VERSION);

    // DI wiring
    let overrides = Arc::new(config::build_overrides(&cli.overrides)?);
    let launcher = Arc::new(TokioProcessLauncher::new(
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
    ));
    let runner = CommandRunner::new(launcher).with_overrides(overrides);

    match cli.command {
        Commands::Run {
            cwd,
            env,
            unset,
            strict,
            output,
            command,
        } => {
            let options = config::build_options(cwd.as_deref(), &env, &unset, strict)
                .context("Invalid execution options")?;

            let command = run::compose(&runner, &command, &options);
            if command.is_null() {
                warn!("Command could not be constructed; nothing will run");
            }

            let (source, cancel) = cancellation_channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling");
                    source.cancel();
                }
            });

            let outcome = run::run(&command, output, &cancel).await?;
            info!(
                exit_code = outcome.exit_code,
                elapsed_ms = outcome.result.elapsed().as_millis() as u64,
                "Run finished"
            );
            print!("{}", outcome.stdout);
            eprint!("{}", outcome.stderr);

            Ok(exit_code(outcome.exit_code))
        }

        Commands::Overrides => {
            let mut rows: Vec<OverrideRow> = runner
                .overrides()
                .snapshot()
                .into_iter()
                .map(|(name, path)| OverrideRow { name, path })
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));

            if rows.is_empty() {
                println!("{}", "No executable overrides configured".yellow());
            } else {
                println!("{}", "Executable overrides".cyan().bold());
                println!("{}", Table::new(rows));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
