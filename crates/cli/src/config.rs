// CLI configuration parsing (flags + CMDFLOW_* environment)

use anyhow::{bail, Context, Result};
use cmdflow_core::domain::{ExecutableOverrides, ExecutionOptions, ResultValidation};

/// Standalone argument separating pipeline stages
pub const STAGE_SEPARATOR: &str = "|";

/// Split `KEY=VALUE`; the key must be non-empty, the value may be
pub fn parse_pair(raw: &str, what: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Invalid {} {:?}: expected KEY=VALUE", what, raw);
    };
    if key.trim().is_empty() {
        bail!("Invalid {} {:?}: empty key", what, raw);
    }
    Ok((key.to_string(), value.to_string()))
}

/// Split trailing arguments on standalone `|` into stages
///
/// Empty stages are kept so that `a | | b` degrades to the null result
/// instead of silently skipping a stage.
pub fn split_stages(arguments: &[String]) -> Vec<Vec<String>> {
    arguments
        .split(|argument| argument == STAGE_SEPARATOR)
        .map(<[String]>::to_vec)
        .collect()
}

/// Options shared by every stage of the command line
pub fn build_options(
    cwd: Option<&str>,
    env: &[String],
    unset: &[String],
    strict: bool,
) -> Result<ExecutionOptions> {
    let mut options = ExecutionOptions::default();

    if let Some(cwd) = cwd {
        options = options.with_working_directory(shellexpand::tilde(cwd).into_owned());
    }

    let mut variables = Vec::with_capacity(env.len() + unset.len());
    for raw in env {
        let (key, value) = parse_pair(raw, "environment variable")?;
        variables.push((key, Some(value)));
    }
    for key in unset {
        variables.push((key.clone(), None));
    }
    if !variables.is_empty() {
        options = options.with_environment_variables(variables);
    }

    if strict {
        options = options.with_validation(ResultValidation::Strict);
    }

    Ok(options)
}

/// Override table from `NAME=PATH` entries (`~` expanded in paths)
pub fn build_overrides(entries: &[String]) -> Result<ExecutableOverrides> {
    let overrides = ExecutableOverrides::new();
    for raw in entries.iter().filter(|raw| !raw.trim().is_empty()) {
        let (name, path) =
            parse_pair(raw, "override").context("Failed to load executable overrides")?;
        overrides.set(name, shellexpand::tilde(&path).into_owned());
    }
    Ok(overrides)
}
