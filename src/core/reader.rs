//! Read-only lookups against the identity database.

use crate::models::identity::{AccountRecord, GroupRecord, PasswordState};
use crate::util::command;
use anyhow::{Context, Result};
use nix::unistd::{Group, Uid, User};

/// Lookups by username, uid, and group name.
///
/// `Ok(None)` means not found; `Err` means the database is unreadable.
pub trait IdentityReader {
    fn find_account_by_name(&self, name: &str) -> Result<Option<AccountRecord>>;
    fn find_account_by_uid(&self, uid: u32) -> Result<Option<AccountRecord>>;
    fn find_group_by_name(&self, name: &str) -> Result<Option<GroupRecord>>;
}

/// Reader backed by the C library name service and `passwd -S`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemReader;

impl SystemReader {
    fn to_record(user: User) -> AccountRecord {
        let password = password_state(&user.name);
        AccountRecord {
            username: user.name,
            uid: user.uid.as_raw(),
            home_directory: user.dir,
            password,
        }
    }
}

impl IdentityReader for SystemReader {
    fn find_account_by_name(&self, name: &str) -> Result<Option<AccountRecord>> {
        let user = User::from_name(name).with_context(|| format!("look up user {}", name))?;
        Ok(user.map(Self::to_record))
    }

    fn find_account_by_uid(&self, uid: u32) -> Result<Option<AccountRecord>> {
        let user = User::from_uid(Uid::from_raw(uid))
            .with_context(|| format!("look up uid {}", uid))?;
        Ok(user.map(Self::to_record))
    }

    fn find_group_by_name(&self, name: &str) -> Result<Option<GroupRecord>> {
        let group = Group::from_name(name).with_context(|| format!("look up group {}", name))?;
        Ok(group.map(|g| GroupRecord {
            group_name: g.name,
            members: g.mem.into_iter().collect(),
        }))
    }
}

/// Ask `passwd -S` for the password status; `Unknown` when it cannot say.
fn password_state(username: &str) -> PasswordState {
    match command::run("passwd", ["-S", username]) {
        Ok(finished) if finished.success() => parse_status_line(&finished.stdout),
        Ok(_) => PasswordState::Unknown,
        Err(e) => {
            tracing::debug!(error = %e, "passwd -S unavailable");
            PasswordState::Unknown
        }
    }
}

/// Parse `passwd -S` output such as `deck P 01/01/2022 0 99999 7 -1`.
fn parse_status_line(output: &str) -> PasswordState {
    output
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .map(PasswordState::from_status)
        .unwrap_or(PasswordState::Unknown)
}
