//! Drive the identity database towards the desired account.
//!
//! Every decision is re-derived from a fresh read, so a run interrupted at
//! any point can simply be repeated.

use crate::core::error::ReconcileError;
use crate::core::executor::CommandExecutor;
use crate::core::reader::IdentityReader;
use crate::models::identity::{AccountRecord, DesiredIdentity, GroupRecord, PasswordState};
use crate::models::outcome::{OperationOutcome, PasswordMarker};
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

pub type ReconcileResult = Result<(), ReconcileError>;

pub struct Reconciler<'a, R, E> {
    identity: &'a DesiredIdentity,
    reader: &'a R,
    executor: &'a E,
}

impl<'a, R: IdentityReader, E: CommandExecutor> Reconciler<'a, R, E> {
    pub fn new(identity: &'a DesiredIdentity, reader: &'a R, executor: &'a E) -> Self {
        Self {
            identity,
            reader,
            executor,
        }
    }

    /// Make sure exactly one account carries the desired name and uid and
    /// that it is not locked.
    pub fn ensure_account(&self) -> ReconcileResult {
        let username = self.identity.username();

        if self.reader.find_account_by_name(username)?.is_none() {
            info!("User {} does not exist, trying to add", username);
            self.create_account()?;
            self.clear_fresh_password()?;
        }

        let account = self
            .reader
            .find_account_by_name(username)?
            .ok_or_else(|| ReconcileError::AccountMissing {
                username: username.to_string(),
            })?;

        if account.uid != self.identity.uid() {
            error!(
                "User {} exists, but uid {} is not expected {}, bailing",
                username, account.uid, self.identity.uid()
            );
            return Err(ReconcileError::UidMismatch {
                username: username.to_string(),
                expected: self.identity.uid(),
                found: account.uid,
            });
        }

        self.ensure_unlocked(&account)
    }

    /// Make sure the account is a member of every required group, adding the
    /// missing ones in a single additive call.
    pub fn ensure_group_membership(&self) -> ReconcileResult {
        let username = self.identity.username();
        let required = self.identity.required_groups();

        let mut missing = BTreeSet::new();
        for group in required {
            let record = self.require_group(group)?;
            if !record.has_member(username) {
                info!("User {} not in group {}, fixing", username, group);
                missing.insert(group.clone());
            }
        }

        if missing.is_empty() {
            debug!("User {} already in all required groups", username);
            return Ok(());
        }

        let outcome = self.executor.add_to_groups(username, &missing)?;
        if !outcome.is_success() {
            warn!("Adding {} to groups reported {}", username, outcome);
        }

        for group in required {
            if !self.require_group(group)?.has_member(username) {
                error!(
                    "Attempt to add user {} to group {} failed, aborting",
                    username, group
                );
                return Err(ReconcileError::MembershipNotApplied {
                    username: username.to_string(),
                    group: group.clone(),
                });
            }
        }
        Ok(())
    }

    fn require_group(&self, group: &str) -> Result<GroupRecord, ReconcileError> {
        self.reader.find_group_by_name(group)?.ok_or_else(|| {
            error!("Group {} does not exist", group);
            ReconcileError::MissingGroup {
                group: group.to_string(),
            }
        })
    }

    fn create_account(&self) -> ReconcileResult {
        let (username, uid) = (self.identity.username(), self.identity.uid());

        match self.executor.create_account(username, uid, false)? {
            OperationOutcome::Success => Ok(()),
            OperationOutcome::UidConflict => self.reclaim_uid(),
            OperationOutcome::NameConflict => {
                warn!(
                    "A group named {} already exists, creating user in that group",
                    username
                );
                match self.executor.create_account(username, uid, true)? {
                    OperationOutcome::Success => Ok(()),
                    OperationOutcome::UidConflict => self.reclaim_uid(),
                    outcome => Err(self.create_failed(outcome)),
                }
            }
            outcome => Err(self.create_failed(outcome)),
        }
    }

    fn create_failed(&self, outcome: OperationOutcome) -> ReconcileError {
        error!("Failed to add user {}: {}", self.identity.username(), outcome);
        ReconcileError::CreateFailed {
            username: self.identity.username().to_string(),
            outcome,
        }
    }

    /// The desired uid belongs to another name: rename that account back.
    fn reclaim_uid(&self) -> ReconcileResult {
        let (username, uid) = (self.identity.username(), self.identity.uid());

        let holder = self
            .reader
            .find_account_by_uid(uid)?
            .ok_or(ReconcileError::UidHolderMissing { uid })?;
        info!(
            "UID {} belongs to {}, renaming it to {}",
            uid, holder.username, username
        );

        match self.executor.rename_account(&holder.username, username, true)? {
            OperationOutcome::Success => Ok(()),
            outcome => {
                error!("User rename failed: {}. Bailing", outcome);
                Err(ReconcileError::RenameFailed {
                    from: holder.username,
                    to: username.to_string(),
                    outcome,
                })
            }
        }
    }

    /// Leave a newly created or adopted account passwordless unless it
    /// already carries a real password.
    fn clear_fresh_password(&self) -> ReconcileResult {
        let username = self.identity.username();
        let Some(account) = self.reader.find_account_by_name(username)? else {
            return Ok(());
        };
        if account.password == PasswordState::Set {
            debug!("User {} keeps its existing password", username);
            return Ok(());
        }
        let outcome = self
            .executor
            .set_password_state(username, PasswordMarker::Cleared)?;
        if !outcome.is_success() {
            warn!("Clearing password of {} reported {}", username, outcome);
        }
        Ok(())
    }

    fn ensure_unlocked(&self, account: &AccountRecord) -> ReconcileResult {
        let username = account.username.as_str();
        if account.password.is_usable() {
            debug!("User {} is not locked ({})", username, account.password);
            return Ok(());
        }

        self.unlock(username)?;

        // `passwd -u` only strips a leading '!'; other disabled markers survive it.
        match self.password_state(username)? {
            PasswordState::Locked => {
                info!("User {} still locked after unlock, clearing password", username);
                self.set_password(username, PasswordMarker::Cleared)?;
                if self.password_state(username)? == PasswordState::Locked {
                    error!("User {} is still locked, bailing", username);
                    return Err(ReconcileError::StillLocked {
                        username: username.to_string(),
                    });
                }
                Ok(())
            }
            PasswordState::Unknown => {
                warn!("Cannot read password state of {}, trusting unlock", username);
                Ok(())
            }
            PasswordState::Set | PasswordState::Empty => Ok(()),
        }
    }

    fn unlock(&self, username: &str) -> ReconcileResult {
        match self.executor.unlock_account(username)? {
            OperationOutcome::Success => Ok(()),
            OperationOutcome::PasswordMissing => {
                info!(
                    "No password set for {}, locking with '{}' to unlock",
                    username,
                    PasswordMarker::Locked.as_field()
                );
                self.set_password(username, PasswordMarker::Locked)?;
                match self.executor.unlock_account(username)? {
                    OperationOutcome::Success => self.set_password(username, PasswordMarker::Cleared),
                    outcome => {
                        error!(
                            "Enabling {} failed after setting password to '{}', bailing",
                            username,
                            PasswordMarker::Locked.as_field()
                        );
                        Err(ReconcileError::UnlockFailed {
                            username: username.to_string(),
                            outcome,
                        })
                    }
                }
            }
            outcome => {
                error!("Enabling {} failed: {}", username, outcome);
                Err(ReconcileError::UnlockFailed {
                    username: username.to_string(),
                    outcome,
                })
            }
        }
    }

    fn set_password(&self, username: &str, marker: PasswordMarker) -> ReconcileResult {
        match self.executor.set_password_state(username, marker)? {
            OperationOutcome::Success => Ok(()),
            outcome => {
                error!(
                    "Setting password of {} to '{}' failed: {}",
                    username,
                    marker.as_field(),
                    outcome
                );
                Err(ReconcileError::PasswordSetFailed {
                    username: username.to_string(),
                    outcome,
                })
            }
        }
    }

    fn password_state(&self, username: &str) -> Result<PasswordState, ReconcileError> {
        let account = self.reader.find_account_by_name(username)?.ok_or_else(|| {
            ReconcileError::AccountMissing {
                username: username.to_string(),
            }
        })?;
        Ok(account.password)
    }
}
