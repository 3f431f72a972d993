//! Desired and observed identity records.

use crate::constants;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// The account this tool enforces. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredIdentity {
    username: String,
    uid: u32,
    required_groups: BTreeSet<String>,
}

impl DesiredIdentity {
    pub fn new<I, S>(username: &str, uid: u32, required_groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.to_string(),
            uid,
            required_groups: required_groups.into_iter().map(Into::into).collect(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn required_groups(&self) -> &BTreeSet<String> {
        &self.required_groups
    }

    /// The compiled-in Steam Deck user.
    pub fn steam_deck() -> Self {
        Self::new(
            constants::TARGET_USERNAME,
            constants::TARGET_UID,
            constants::REQUIRED_GROUPS.iter().map(|(name, _gid)| *name),
        )
    }
}

impl fmt::Display for DesiredIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(uid={})", self.username, self.uid)
    }
}

/// Password field state as reported by `passwd -S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordState {
    /// A usable password is set.
    Set,
    /// Locked or disabled: password login is refused.
    Locked,
    /// No password at all.
    Empty,
    /// The status could not be determined.
    Unknown,
}

impl PasswordState {
    /// Parse the status column of `passwd -S` output (`P`, `L`, `NP`).
    pub fn from_status(code: &str) -> Self {
        match code {
            "P" | "PS" => PasswordState::Set,
            "L" | "LK" => PasswordState::Locked,
            "NP" => PasswordState::Empty,
            _ => PasswordState::Unknown,
        }
    }

    /// Whether the account can be used without an unlock.
    pub fn is_usable(self) -> bool {
        matches!(self, PasswordState::Set | PasswordState::Empty)
    }
}

impl fmt::Display for PasswordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PasswordState::Set => "set",
            PasswordState::Locked => "locked",
            PasswordState::Empty => "empty",
            PasswordState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Snapshot of an account as currently stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub username: String,
    pub uid: u32,
    pub home_directory: PathBuf,
    pub password: PasswordState,
}

/// Snapshot of a group and its supplementary members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub group_name: String,
    pub members: BTreeSet<String>,
}

impl GroupRecord {
    pub fn has_member(&self, username: &str) -> bool {
        self.members.contains(username)
    }
}
