//! Run account-management utilities and capture what they report.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::process::Command;

/// Exit status and captured streams of a finished utility.
#[derive(Debug, Clone)]
pub struct Finished {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Finished {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Run `program` with `args`, blocking until it exits.
///
/// Only a failure to spawn is an error; a non-zero exit is reported in
/// [`Finished::code`] for the caller to classify.
pub fn run<I, S>(program: &str, args: I) -> Result<Finished>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    tracing::debug!(command = ?cmd, "running");
    let output = cmd.output().with_context(|| format!("run {}", program))?;
    let finished = Finished {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if !finished.success() {
        tracing::debug!(program, code = ?finished.code, "non-zero exit");
    }
    Ok(finished)
}
