// Tool Command - seam for per-tool argument builders

use async_trait::async_trait;

use crate::application::{CommandResult, CommandRunner};
use crate::domain::{ExecutionOptions, ExecutionResult};
use crate::port::CancellationToken;

/// A fluent builder for one external program
///
/// Implementors only translate their configuration into a program name and
/// an argument vector. Building and the terminal shortcuts come for free and
/// behave exactly like the [`CommandResult`] returned by `build`.
#[async_trait]
pub trait ToolCommand: Send + Sync {
    /// Logical program name (resolved through the runner's overrides)
    fn program(&self) -> &str;

    fn arguments(&self) -> Vec<String>;

    fn options(&self) -> ExecutionOptions {
        ExecutionOptions::default()
    }

    fn build(&self, runner: &CommandRunner) -> CommandResult {
        runner.run_with(self.program(), self.arguments(), Some(self.options()))
    }

    async fn text(&self, runner: &CommandRunner, cancel: &CancellationToken) -> String {
        self.build(runner).text(cancel).await
    }

    async fn lines(&self, runner: &CommandRunner, cancel: &CancellationToken) -> Vec<String> {
        self.build(runner).lines(cancel).await
    }

    async fn execute(&self, runner: &CommandRunner, cancel: &CancellationToken) -> ExecutionResult {
        self.build(runner).execute(cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::process_launcher::mocks::MockProcessLauncher;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Default)]
    struct GitLog {
        repo: Option<PathBuf>,
        oneline: bool,
        max_count: Option<usize>,
    }

    impl GitLog {
        fn repo(mut self, path: impl Into<PathBuf>) -> Self {
            self.repo = Some(path.into());
            self
        }

        fn oneline(mut self) -> Self {
            self.oneline = true;
            self
        }

        fn max_count(mut self, count: usize) -> Self {
            self.max_count = Some(count);
            self
        }
    }

    impl ToolCommand for GitLog {
        fn program(&self) -> &str {
            "git"
        }

        fn arguments(&self) -> Vec<String> {
            let mut args = vec!["log".to_string()];
            if self.oneline {
                args.push("--oneline".to_string());
            }
            if let Some(count) = self.max_count {
                args.push(format!("--max-count={}", count));
            }
            args
        }

        fn options(&self) -> ExecutionOptions {
            match &self.repo {
                Some(repo) => ExecutionOptions::default().with_working_directory(repo),
                None => ExecutionOptions::default(),
            }
        }
    }

    #[tokio::test]
    async fn test_builder_shortcuts_delegate_to_build() {
        let launcher = Arc::new(MockProcessLauncher::new_output("abc123 first\ndef456 second\n"));
        let runner = CommandRunner::new(launcher.clone());
        runner.overrides().set("git", "/usr/bin/git");
        let cancel = CancellationToken::none();

        let log = GitLog::default().repo("/src/project").oneline().max_count(2);
        let built = log.build(&runner);
        let spec = &built.pipeline().unwrap().stages()[0];

        assert_eq!(built.to_string(), "/usr/bin/git log --oneline --max-count=2");
        assert_eq!(spec.options().working_directory(), Some(&PathBuf::from("/src/project")));

        assert_eq!(log.lines(&runner, &cancel).await, vec!["abc123 first", "def456 second"]);
        assert_eq!(log.text(&runner, &cancel).await, "abc123 first\ndef456 second\n");
        assert_eq!(log.execute(&runner, &cancel).await.exit_code, 0);
        assert_eq!(launcher.call_count(), 3);
    }
}
