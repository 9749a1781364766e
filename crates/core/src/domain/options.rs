// Execution options - immutable, derived with `with_*` copies

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Whether a non-zero exit code is a failure signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultValidation {
    /// Non-zero exit is reported as `ExecutionError::NonZeroExit`
    Strict,
    /// Non-zero exit is an ordinary result
    #[default]
    Tolerant,
}

/// Working directory, environment overlay and validation mode for one command
///
/// Every `with_*` call returns a new value; the receiver is never touched.
/// The environment overlay is shared between derived copies until one of
/// them changes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    working_directory: Option<PathBuf>,
    environment: Arc<HashMap<String, Option<String>>>,
    validation: Option<ResultValidation>,
}

impl ExecutionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn working_directory(&self) -> Option<&PathBuf> {
        self.working_directory.as_ref()
    }

    /// Overlay entries; `None` values unset the inherited variable
    pub fn environment(&self) -> &HashMap<String, Option<String>> {
        &self.environment
    }

    /// Validation mode, if explicitly chosen
    pub fn validation(&self) -> Option<ResultValidation> {
        self.validation
    }

    /// A blank path clears the working directory instead of failing
    pub fn with_working_directory(&self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let working_directory = if path.as_os_str().to_string_lossy().trim().is_empty() {
            None
        } else {
            Some(path)
        };
        Self {
            working_directory,
            ..self.clone()
        }
    }

    pub fn with_environment_variable(
        &self,
        key: impl Into<String>,
        value: Option<impl Into<String>>,
    ) -> Self {
        let mut derived = self.clone();
        Arc::make_mut(&mut derived.environment).insert(key.into(), value.map(Into::into));
        derived
    }

    /// Merge a batch of overlay entries; later keys win
    pub fn with_environment_variables<I, K, V>(&self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut derived = self.clone();
        let environment = Arc::make_mut(&mut derived.environment);
        for (key, value) in variables {
            environment.insert(key.into(), value.map(Into::into));
        }
        derived
    }

    pub fn with_validation(&self, validation: ResultValidation) -> Self {
        Self {
            validation: Some(validation),
            ..self.clone()
        }
    }

    /// Write these options into a launch configuration right before spawn
    ///
    /// Only explicitly set parts are applied; everything else keeps the
    /// configuration's own defaults.
    pub fn apply(&self, config: &mut LaunchConfig) {
        if let Some(dir) = &self.working_directory {
            config.working_directory = Some(dir.clone());
        }
        if !self.environment.is_empty() {
            for (key, value) in self.environment.iter() {
                config.environment.insert(key.clone(), value.clone());
            }
        }
        if let Some(validation) = self.validation {
            config.validation = validation;
        }
    }
}

/// Fully resolved parameters for a single OS process launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub program: String,
    pub arguments: Vec<String>,
    pub working_directory: Option<PathBuf>,
    pub environment: HashMap<String, Option<String>>,
    pub validation: ResultValidation,
}

impl LaunchConfig {
    /// Start from the caller default (tolerant, inherited cwd and env)
    pub fn new(program: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            program: program.into(),
            arguments,
            working_directory: None,
            environment: HashMap::new(),
            validation: ResultValidation::default(),
        }
    }
}
