//! Mutating operations against the identity database.
//!
//! Every call returns a classified [`OperationOutcome`]; only a failure to
//! run the utility at all is an `Err`.

use crate::constants;
use crate::models::outcome::{OperationOutcome, PasswordMarker};
use crate::util::command;
use anyhow::Result;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::PathBuf;

pub trait CommandExecutor {
    /// Create `username` with `uid`, a home directory, the default shell and
    /// the managed-account comment. With `bind_to_own_group` the account's
    /// primary group is the existing group named `username`.
    fn create_account(
        &self,
        username: &str,
        uid: u32,
        bind_to_own_group: bool,
    ) -> Result<OperationOutcome>;

    /// Rename `old_name` to `new_name` keeping its uid. With `relocate_home`
    /// the home is pointed at the canonical path of `new_name` and its
    /// contents move there unless that directory already exists. Without it
    /// the home path is left alone.
    fn rename_account(
        &self,
        old_name: &str,
        new_name: &str,
        relocate_home: bool,
    ) -> Result<OperationOutcome>;

    fn set_password_state(&self, username: &str, marker: PasswordMarker)
        -> Result<OperationOutcome>;

    /// Clear the account-disabled flag. Reports
    /// [`OperationOutcome::PasswordMissing`] when there is no password to unlock.
    fn unlock_account(&self, username: &str) -> Result<OperationOutcome>;

    /// Add `username` to every group in `groups` without touching other memberships.
    fn add_to_groups(&self, username: &str, groups: &BTreeSet<String>) -> Result<OperationOutcome>;
}

/// Executor driving shadow-utils (`useradd`, `usermod`, `passwd`).
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    home_root: PathBuf,
}

impl Default for SystemExecutor {
    fn default() -> Self {
        Self::new(PathBuf::from(constants::DEFAULT_HOME_ROOT))
    }
}

impl SystemExecutor {
    pub fn new(home_root: PathBuf) -> Self {
        Self { home_root }
    }

    /// Default home directory location for `username`.
    pub fn canonical_home(&self, username: &str) -> PathBuf {
        self.home_root.join(username)
    }

    fn useradd_args(&self, username: &str, uid: u32, bind_to_own_group: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-u".into(),
            uid.to_string().into(),
            "-c".into(),
            constants::ACCOUNT_COMMENT.into(),
            "-s".into(),
            constants::DEFAULT_SHELL.into(),
        ];
        if bind_to_own_group {
            args.push("-g".into());
            args.push(username.into());
        }
        let home = self.canonical_home(username);
        if !home.is_dir() {
            args.push("-m".into());
            args.push("-d".into());
            args.push(home.into_os_string());
        }
        args.push(username.into());
        args
    }

    fn rename_args(&self, old_name: &str, new_name: &str, relocate_home: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if relocate_home {
            let home = self.canonical_home(new_name);
            let move_home = !home.is_dir();
            args.push("-d".into());
            args.push(home.into_os_string());
            if move_home {
                args.push("-m".into());
            }
        }
        args.extend(["-l".into(), new_name.into(), old_name.into()]);
        args
    }

    fn add_groups_args(username: &str, groups: &BTreeSet<String>) -> Vec<OsString> {
        let joined = groups.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        vec!["-a".into(), "-G".into(), joined.into(), username.into()]
    }
}

fn account_util(program: &str, args: Vec<OsString>) -> Result<OperationOutcome> {
    let finished = command::run(program, args)?;
    let outcome = OperationOutcome::from_account_exit(finished.code);
    log_failure(program, outcome, &finished.stderr);
    Ok(outcome)
}

fn passwd_util(args: Vec<OsString>) -> Result<OperationOutcome> {
    let finished = command::run("passwd", args)?;
    let outcome = OperationOutcome::from_passwd_exit(finished.code);
    log_failure("passwd", outcome, &finished.stderr);
    Ok(outcome)
}

fn log_failure(program: &str, outcome: OperationOutcome, stderr: &str) {
    if !outcome.is_success() {
        tracing::warn!(program, %outcome, stderr = %stderr.trim(), "utility did not succeed");
    }
}

impl CommandExecutor for SystemExecutor {
    fn create_account(
        &self,
        username: &str,
        uid: u32,
        bind_to_own_group: bool,
    ) -> Result<OperationOutcome> {
        account_util("useradd", self.useradd_args(username, uid, bind_to_own_group))
    }

    fn rename_account(
        &self,
        old_name: &str,
        new_name: &str,
        relocate_home: bool,
    ) -> Result<OperationOutcome> {
        account_util("usermod", self.rename_args(old_name, new_name, relocate_home))
    }

    fn set_password_state(
        &self,
        username: &str,
        marker: PasswordMarker,
    ) -> Result<OperationOutcome> {
        let args: Vec<OsString> = vec!["-p".into(), marker.as_field().into(), username.into()];
        account_util("usermod", args)
    }

    fn unlock_account(&self, username: &str) -> Result<OperationOutcome> {
        passwd_util(vec!["-u".into(), username.into()])
    }

    fn add_to_groups(&self, username: &str, groups: &BTreeSet<String>) -> Result<OperationOutcome> {
        account_util("usermod", Self::add_groups_args(username, groups))
    }
}
