//! Fatal reconciliation failures.

use crate::models::outcome::OperationOutcome;
use thiserror::Error;

/// Every way a reconciliation run can end without a compliant account.
///
/// Recoverable conflicts never appear here; they are branched on as
/// [`OperationOutcome`] values inside the reconciler.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The identity database or a utility could not be reached at all.
    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),

    #[error("creating user {username} failed: {outcome}")]
    CreateFailed {
        username: String,
        outcome: OperationOutcome,
    },

    #[error("renaming user {from} to {to} failed: {outcome}")]
    RenameFailed {
        from: String,
        to: String,
        outcome: OperationOutcome,
    },

    #[error("uid {uid} reported in use but no account holds it")]
    UidHolderMissing { uid: u32 },

    #[error("user {username} still missing after creation")]
    AccountMissing { username: String },

    #[error("user {username} exists, but uid {found} is not the expected {expected}")]
    UidMismatch {
        username: String,
        expected: u32,
        found: u32,
    },

    #[error("unlocking user {username} failed: {outcome}")]
    UnlockFailed {
        username: String,
        outcome: OperationOutcome,
    },

    #[error("setting password of user {username} failed: {outcome}")]
    PasswordSetFailed {
        username: String,
        outcome: OperationOutcome,
    },

    #[error("user {username} is still locked after unlocking")]
    StillLocked { username: String },

    #[error("group {group} does not exist")]
    MissingGroup { group: String },

    #[error("user {username} still not in group {group} after adding")]
    MembershipNotApplied { username: String, group: String },
}
