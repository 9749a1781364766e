// Command Runner - entry point that turns (executable, args, options) into results

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::application::CommandResult;
use crate::domain::{CommandSpec, ExecutableOverrides, ExecutionOptions, Pipeline};
use crate::port::ProcessLauncher;

/// Builds [`CommandResult`]s bound to one launcher and one override table
///
/// Cloning is cheap; clones share the launcher and the override table.
#[derive(Clone)]
pub struct CommandRunner {
    launcher: Arc<dyn ProcessLauncher>,
    overrides: Arc<ExecutableOverrides>,
}

impl CommandRunner {
    /// Runner with an empty override table
    pub fn new(launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            launcher,
            overrides: Arc::new(ExecutableOverrides::new()),
        }
    }

    pub fn with_overrides(self, overrides: Arc<ExecutableOverrides>) -> Self {
        Self { overrides, ..self }
    }

    pub fn overrides(&self) -> &Arc<ExecutableOverrides> {
        &self.overrides
    }

    pub(crate) fn launcher(&self) -> &Arc<dyn ProcessLauncher> {
        &self.launcher
    }

    /// Describe a command with default options
    ///
    /// Never fails: an invalid description yields the null result, which
    /// answers every terminal operation with an empty value.
    pub fn run<I, S>(&self, executable: &str, arguments: I) -> CommandResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_with(executable, arguments, Some(ExecutionOptions::default()))
    }

    /// Describe a command; `None` options produce the null result
    pub fn run_with<I, S>(
        &self,
        executable: &str,
        arguments: I,
        options: Option<ExecutionOptions>,
    ) -> CommandResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.build_spec(executable, arguments, options) {
            Some(spec) => CommandResult::new(self.clone(), Pipeline::single(spec)),
            None => CommandResult::null(),
        }
    }

    /// Wrap a prebuilt spec, resolving its executable through the overrides
    pub fn run_spec(&self, spec: &CommandSpec) -> CommandResult {
        self.run_with(
            spec.executable(),
            spec.arguments().iter().cloned(),
            Some(spec.options().clone()),
        )
    }

    pub(crate) fn build_spec<I, S>(
        &self,
        executable: &str,
        arguments: I,
        options: Option<ExecutionOptions>,
    ) -> Option<CommandSpec>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(options) = options else {
            debug!(executable = %executable, "No execution options, returning null result");
            return None;
        };
        if executable.trim().is_empty() {
            debug!("Blank executable, returning null result");
            return None;
        }

        let resolved = self.overrides.get(executable);
        match CommandSpec::new(resolved, arguments, options) {
            Ok(spec) => Some(spec),
            Err(e) => {
                debug!(
                    executable = %executable,
                    error = %e,
                    "Command construction failed, returning null result"
                );
                None
            }
        }
    }
}

impl fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRunner")
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::process_launcher::mocks::MockProcessLauncher;

    fn runner() -> CommandRunner {
        CommandRunner::new(Arc::new(MockProcessLauncher::new_output("")))
    }

    #[test]
    fn test_invalid_constructions_are_null() {
        let runner = runner();
        assert!(runner.run("", ["x"]).is_null());
        assert!(runner.run("   ", Vec::<String>::new()).is_null());
        assert!(runner.run_with("echo", ["hi"], None).is_null());
        assert!(runner.run("echo", ["nul\0byte"]).is_null());
        assert!(!runner.run("echo", ["hi"]).is_null());
    }

    #[test]
    fn test_overrides_resolved_at_construction() {
        let runner = runner();
        runner.overrides().set("tool", "/opt/double/tool");

        let result = runner.run("tool", ["--version"]);
        runner.overrides().clear("tool");

        let pipeline = result.pipeline().unwrap();
        assert_eq!(pipeline.stages()[0].executable(), "/opt/double/tool");
        assert_eq!(runner.run("tool", ["--version"]).to_string(), "tool --version");
    }

    #[test]
    fn test_runners_can_share_an_override_table() {
        let shared = Arc::new(ExecutableOverrides::new());
        let first = runner().with_overrides(Arc::clone(&shared));
        let second = runner().with_overrides(Arc::clone(&shared));

        first.overrides().set("kubectl", "/usr/local/bin/kubectl-fake");
        assert!(second.overrides().has("kubectl"));
    }

    #[test]
    fn test_run_spec_applies_overrides() {
        let runner = runner();
        runner.overrides().set("git", "/fake/git");
        let spec = CommandSpec::builder("git").arg("status").build().unwrap();

        let result = runner.run_spec(&spec);
        assert_eq!(result.to_string(), "/fake/git status");
    }
}
