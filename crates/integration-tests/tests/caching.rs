//! Memoization against non-deterministic real processes
//!
//! `sh -c 'echo $$'` prints its own PID, which differs on every launch.

#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use cmdflow_core::port::id_provider::UuidProvider;
use cmdflow_core::port::time_provider::SystemTimeProvider;
use cmdflow_core::{CancellationToken, CommandResult, CommandRunner};
use cmdflow_infra_system::TokioProcessLauncher;

fn runner() -> CommandRunner {
    CommandRunner::new(Arc::new(TokioProcessLauncher::new(
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
    )))
}

fn pid_command(runner: &CommandRunner) -> CommandResult {
    runner.run("sh", ["-c", "echo $$"])
}

#[tokio::test]
async fn test_cached_terminal_operations_agree() {
    let cancel = CancellationToken::none();
    let command = pid_command(&runner()).cached();

    let lines = command.lines(&cancel).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let text = command.text(&cancel).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let result = command.execute(&cancel).await;

    assert!(!text.is_empty());
    assert_eq!(lines, vec![text.trim().to_string()]);
    assert_eq!(result.stdout, text);
}

#[tokio::test]
async fn test_uncached_output_changes() {
    let cancel = CancellationToken::none();
    let command = pid_command(&runner());

    let first = command.text(&cancel).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = command.text(&cancel).await;

    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_cache_isolation_between_instances() {
    let cancel = CancellationToken::none();
    let runner = runner();
    let first = pid_command(&runner).cached();
    let second = pid_command(&runner).cached();

    let a = first.text(&cancel).await;
    let b = second.text(&cancel).await;

    assert_ne!(a, b);
    assert_eq!(first.text(&cancel).await, a);
    assert_eq!(second.text(&cancel).await, b);
}

#[tokio::test]
async fn test_cached_pipeline_runs_once() {
    let cancel = CancellationToken::none();
    let command = pid_command(&runner()).cached().pipe("cat", Vec::<String>::new());

    assert!(command.is_cached());
    let first = command.text(&cancel).await;
    let second = command.text(&cancel).await;
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_launch() {
    let cancel = CancellationToken::none();
    let command = pid_command(&runner()).cached();

    let outputs = join_all((0..5).map(|_| command.text(&cancel))).await;

    assert!(!outputs[0].is_empty());
    assert!(outputs.iter().all(|output| output == &outputs[0]));
}
