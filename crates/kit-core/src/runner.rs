//! Install step execution

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use kit_git::strip_clone_pins;
use kit_meta::InstallMethod;

use crate::{Error, Result};

/// Run install steps in order with `sh -c`, inside `build_dir`.
///
/// `environment` is layered over the inherited environment of each child;
/// the current process environment is left untouched. With
/// [`InstallMethod::Latest`], `git clone` lines lose their branch pins first.
/// The first failing step aborts the rest.
pub fn run_steps(
    package: &str,
    steps: &[String],
    build_dir: &Path,
    environment: &BTreeMap<String, String>,
    method: InstallMethod,
) -> Result<()> {
    for (index, step) in steps.iter().enumerate() {
        let line = if method.is_latest() {
            strip_clone_pins(step)
        } else {
            step.clone()
        };

        tracing::debug!(package = %package, step = index + 1, command = %line, "Running install step");

        let status = Command::new("sh")
            .arg("-c")
            .arg(&line)
            .current_dir(build_dir)
            .envs(environment)
            .status()
            .map_err(|e| Error::StepFailed {
                package: package.to_string(),
                step: line.clone(),
                reason: format!("could not start shell: {e}"),
            })?;

        if !status.success() {
            let reason = match status.code() {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            };
            return Err(Error::StepFailed {
                package: package.to_string(),
                step: line,
                reason,
            });
        }
    }
    Ok(())
}
