//! Classified results of identity database mutations.

use crate::constants;
use std::fmt;

/// What a mutating utility reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    Success,
    /// The requested uid is bound to a different account.
    UidConflict,
    /// The requested account or group name is already taken.
    NameConflict,
    /// Unlock refused because the account has no password at all.
    PasswordMissing,
    /// Any other non-zero exit; `None` when the utility was killed by a signal.
    OtherFailure(Option<i32>),
}

impl OperationOutcome {
    /// Classify a `useradd`/`usermod` exit code.
    pub fn from_account_exit(code: Option<i32>) -> Self {
        match code {
            Some(0) => OperationOutcome::Success,
            Some(constants::EXIT_UID_IN_USE) => OperationOutcome::UidConflict,
            Some(constants::EXIT_NAME_IN_USE) => OperationOutcome::NameConflict,
            other => OperationOutcome::OtherFailure(other),
        }
    }

    /// Classify a `passwd` exit code.
    pub fn from_passwd_exit(code: Option<i32>) -> Self {
        match code {
            Some(0) => OperationOutcome::Success,
            Some(constants::EXIT_PASSWD_NO_PASSWORD) => OperationOutcome::PasswordMissing,
            other => OperationOutcome::OtherFailure(other),
        }
    }

    pub fn is_success(self) -> bool {
        self == OperationOutcome::Success
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationOutcome::Success => f.write_str("success"),
            OperationOutcome::UidConflict => f.write_str("uid already in use"),
            OperationOutcome::NameConflict => f.write_str("name already in use"),
            OperationOutcome::PasswordMissing => f.write_str("no password set"),
            OperationOutcome::OtherFailure(Some(code)) => write!(f, "failed with exit code {}", code),
            OperationOutcome::OtherFailure(None) => f.write_str("terminated by signal"),
        }
    }
}

/// Password field values this tool writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordMarker {
    /// Empty field: passwordless but not locked.
    Cleared,
    /// `*`: no valid password, used as a stepping stone for unlocking.
    Locked,
}

impl PasswordMarker {
    pub fn as_field(self) -> &'static str {
        match self {
            PasswordMarker::Cleared => "",
            PasswordMarker::Locked => constants::LOCKED_PASSWORD_MARKER,
        }
    }
}
