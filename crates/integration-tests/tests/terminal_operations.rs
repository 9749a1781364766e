//! Terminal operations against real processes
//!
//! text / lines / execute, soft failure, cancellation and overrides

#![cfg(unix)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use cmdflow_core::domain::{ExecutionOptions, ExecutionResult, ResultValidation};
use cmdflow_core::port::id_provider::UuidProvider;
use cmdflow_core::port::time_provider::SystemTimeProvider;
use cmdflow_core::port::ExecutionError;
use cmdflow_core::{cancellation_channel, CancellationToken, CommandError, CommandRunner};
use cmdflow_infra_system::TokioProcessLauncher;

fn runner() -> CommandRunner {
    CommandRunner::new(Arc::new(TokioProcessLauncher::new(
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
    )))
}

#[tokio::test]
async fn test_text_is_verbatim() {
    let text = runner()
        .run("echo", ["hello", "world"])
        .text(&CancellationToken::none())
        .await;
    assert_eq!(text, "hello world\n");
}

#[tokio::test]
async fn test_arguments_are_not_shell_interpreted() {
    let text = runner()
        .run("echo", ["$HOME", "*", "a b"])
        .text(&CancellationToken::none())
        .await;
    assert_eq!(text, "$HOME * a b\n");
}

#[tokio::test]
async fn test_lines_drop_empty_segments() {
    let lines = runner()
        .run("printf", ["line1\\n\\nline2\\n\\n"])
        .lines(&CancellationToken::none())
        .await;
    assert_eq!(lines, vec!["line1", "line2"]);
}

#[tokio::test]
async fn test_execute_reports_exit_code_and_timing() {
    let result = runner()
        .run("sh", ["-c", "echo out; echo err >&2; sleep 0.1; exit 5"])
        .execute(&CancellationToken::none())
        .await;

    assert_eq!(result.exit_code, 5);
    assert!(!result.is_success());
    assert_eq!(result.stdout, "out\n");
    assert_eq!(result.stderr, "err\n");
    assert!(result.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_unknown_executable_behaves_like_no_output() {
    let command = runner().run("cmdflow-no-such-program", ["--help"]);
    let cancel = CancellationToken::none();

    assert!(!command.is_null());
    assert_eq!(command.text(&cancel).await, "");
    assert!(command.lines(&cancel).await.is_empty());
    assert_eq!(command.execute(&cancel).await, ExecutionResult::default());
    assert!(matches!(
        command.try_execute(&cancel).await,
        Err(CommandError::Execution(ExecutionError::SpawnFailed { .. }))
    ));
}

#[tokio::test]
async fn test_null_result_totality() {
    let runner = runner();
    let cancel = CancellationToken::none();

    for command in [
        runner.run("", ["echo"]),
        runner.run("  \t", Vec::<String>::new()),
        runner.run_with("echo", ["hi"], None),
    ] {
        assert!(command.is_null());
        assert_eq!(command.text(&cancel).await, "");
        assert!(command.lines(&cancel).await.is_empty());
        let result = command.execute(&cancel).await;
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.is_empty() && result.stderr.is_empty());
        assert_eq!(result.elapsed(), Duration::ZERO);
    }
}

#[tokio::test]
async fn test_strict_validation_empties_output() {
    let runner = runner();
    let cancel = CancellationToken::none();
    let strict = ExecutionOptions::default().with_validation(ResultValidation::Strict);

    let tolerant = runner.run("sh", ["-c", "echo partial; exit 1"]);
    let strict = runner.run_with("sh", ["-c", "echo partial; exit 1"], Some(strict));

    assert_eq!(tolerant.text(&cancel).await, "partial\n");
    assert_eq!(strict.text(&cancel).await, "");
    assert!(matches!(
        strict.try_execute(&cancel).await,
        Err(CommandError::Execution(ExecutionError::NonZeroExit { exit_code: 1, .. }))
    ));
}

#[tokio::test]
async fn test_options_reach_the_process() {
    let options = ExecutionOptions::default()
        .with_working_directory("/")
        .with_environment_variable("CMDFLOW_GREETING", Some("hi"));

    let text = runner()
        .run_with("sh", ["-c", "echo \"$CMDFLOW_GREETING from $(pwd)\""], Some(options))
        .text(&CancellationToken::none())
        .await;
    assert_eq!(text, "hi from /\n");
}

#[tokio::test]
async fn test_already_cancelled_token_yields_empty() {
    let (source, cancel) = cancellation_channel();
    source.cancel();
    let command = runner().run("echo", ["never"]);

    assert_eq!(command.text(&cancel).await, "");
    assert!(command.lines(&cancel).await.is_empty());
    assert_eq!(command.execute(&cancel).await, ExecutionResult::default());
}

#[tokio::test]
async fn test_cancel_during_read_yields_empty() {
    let (source, cancel) = cancellation_channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        source.cancel();
    });

    let started = Instant::now();
    let text = runner().run("sh", ["-c", "sleep 2; echo late"]).text(&cancel).await;

    assert_eq!(text, "");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_executable_override_round_trip() {
    let runner = runner();
    let cancel = CancellationToken::none();

    runner.overrides().set("cmdflow-greeter", "echo");
    assert!(runner.overrides().has("cmdflow-greeter"));
    assert_eq!(runner.run("cmdflow-greeter", ["hi"]).text(&cancel).await, "hi\n");

    runner.overrides().clear("cmdflow-greeter");
    assert_eq!(runner.overrides().get("cmdflow-greeter"), "cmdflow-greeter");
    assert_eq!(runner.run("cmdflow-greeter", ["hi"]).text(&cancel).await, "");
}
