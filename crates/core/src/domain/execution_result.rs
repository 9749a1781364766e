// Execution Result - one real launch, immutable

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Outcome of one real process (or pipeline) launch
///
/// `Default` is the zero-valued result handed out when nothing ran:
/// exit code 0, minimal timestamps, empty output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Wall-clock time between start and end (zero if the clock went backwards)
    pub fn elapsed(&self) -> Duration {
        (self.end_time - self.start_time).to_std().unwrap_or(Duration::ZERO)
    }

    /// Stdout split on `\n` / `\r` with empty segments dropped
    pub fn lines(&self) -> Vec<String> {
        split_lines(&self.stdout)
    }
}

impl Default for ExecutionResult {
    fn default() -> Self {
        Self {
            exit_code: 0,
            start_time: DateTime::<Utc>::MIN_UTC,
            end_time: DateTime::<Utc>::MIN_UTC,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Serialized with a derived `success` flag and `elapsed_ms`
impl Serialize for ExecutionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ExecutionResult", 7)?;
        state.serialize_field("exit_code", &self.exit_code)?;
        state.serialize_field("success", &self.is_success())?;
        state.serialize_field("start_time", &self.start_time)?;
        state.serialize_field("end_time", &self.end_time)?;
        state.serialize_field("elapsed_ms", &(self.elapsed().as_millis() as u64))?;
        state.serialize_field("stdout", &self.stdout)?;
        state.serialize_field("stderr", &self.stderr)?;
        state.end()
    }
}

pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.split(['\n', '\r'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
