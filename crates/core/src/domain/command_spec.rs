// Command descriptions (one process) and pipelines (stdout -> stdin chains)

use std::fmt;
use std::path::PathBuf;

use super::error::{Result, SpecError};
use super::options::{ExecutionOptions, LaunchConfig, ResultValidation};

/// Immutable description of one process invocation
///
/// Arguments are handed to the OS launcher verbatim; nothing here quotes,
/// splits or expands them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    executable: String,
    arguments: Vec<String>,
    options: ExecutionOptions,
}

impl CommandSpec {
    /// Build a spec, rejecting blank executables and NUL bytes
    pub fn new<I, S>(
        executable: impl Into<String>,
        arguments: I,
        options: ExecutionOptions,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let executable = executable.into();
        if executable.trim().is_empty() {
            return Err(SpecError::BlankExecutable);
        }
        reject_nul(&executable)?;

        let arguments: Vec<String> = arguments.into_iter().map(Into::into).collect();
        for argument in &arguments {
            reject_nul(argument)?;
        }

        Ok(Self {
            executable,
            arguments,
            options,
        })
    }

    pub fn builder(executable: impl Into<String>) -> CommandSpecBuilder {
        CommandSpecBuilder::new(executable)
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Resolve into the parameters the launcher consumes
    pub fn launch_config(&self) -> LaunchConfig {
        let mut config = LaunchConfig::new(self.executable.clone(), self.arguments.clone());
        self.options.apply(&mut config);
        config
    }
}

fn reject_nul(value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(SpecError::NulByte(value.replace('\0', "\\0")));
    }
    Ok(())
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable)?;
        for argument in &self.arguments {
            write!(f, " {}", argument)?;
        }
        Ok(())
    }
}

/// Fluent construction of a [`CommandSpec`]
#[derive(Debug, Clone)]
pub struct CommandSpecBuilder {
    executable: String,
    arguments: Vec<String>,
    options: ExecutionOptions,
}

impl CommandSpecBuilder {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            arguments: Vec::new(),
            options: ExecutionOptions::default(),
        }
    }

    pub fn arg(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn args<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    pub fn working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.options = self.options.with_working_directory(path);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options = self.options.with_environment_variable(key, Some(value));
        self
    }

    pub fn unset_env(mut self, key: impl Into<String>) -> Self {
        self.options = self.options.with_environment_variable(key, None::<String>);
        self
    }

    pub fn validation(mut self, validation: ResultValidation) -> Self {
        self.options = self.options.with_validation(validation);
        self
    }

    pub fn options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<CommandSpec> {
        CommandSpec::new(self.executable, self.arguments, self.options)
    }
}

/// Ordered, non-empty chain of stages; stage i stdout feeds stage i+1 stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<CommandSpec>,
}

impl Pipeline {
    pub fn single(spec: CommandSpec) -> Self {
        Self { stages: vec![spec] }
    }

    /// New pipeline with `next` appended; `self` is left as is
    pub fn then(&self, next: CommandSpec) -> Self {
        let mut stages = self.stages.clone();
        stages.push(next);
        Self { stages }
    }

    pub fn stages(&self) -> &[CommandSpec] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Never true for a constructed pipeline
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, stage) in self.stages.iter().enumerate() {
            if index > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", stage)?;
        }
        Ok(())
    }
}
