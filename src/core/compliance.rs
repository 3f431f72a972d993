//! Read-only assessment of the desired account against current state.

use crate::core::reader::IdentityReader;
use crate::models::identity::{DesiredIdentity, PasswordState};
use anyhow::Result;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warn => "WARN",
            CheckStatus::Fail => "FAIL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub status: CheckStatus,
    pub message: String,
}

impl Finding {
    fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Check every invariant without mutating anything.
pub fn assess<R: IdentityReader>(identity: &DesiredIdentity, reader: &R) -> Result<Vec<Finding>> {
    let username = identity.username();
    let mut findings = Vec::new();

    match reader.find_account_by_name(username)? {
        None => findings.push(Finding::new(
            CheckStatus::Fail,
            format!("user {} missing", username),
        )),
        Some(account) => {
            findings.push(Finding::new(
                CheckStatus::Pass,
                format!("user {} exists", username),
            ));
            if account.uid == identity.uid() {
                findings.push(Finding::new(
                    CheckStatus::Pass,
                    format!("uid is {}", identity.uid()),
                ));
            } else {
                findings.push(Finding::new(
                    CheckStatus::Fail,
                    format!("uid is {} (expected {})", account.uid, identity.uid()),
                ));
            }
            let status = match account.password {
                PasswordState::Set | PasswordState::Empty => CheckStatus::Pass,
                PasswordState::Locked => CheckStatus::Fail,
                PasswordState::Unknown => CheckStatus::Warn,
            };
            findings.push(Finding::new(
                status,
                format!("password state: {}", account.password),
            ));
        }
    }

    if let Some(holder) = reader.find_account_by_uid(identity.uid())? {
        if holder.username != username {
            findings.push(Finding::new(
                CheckStatus::Warn,
                format!("uid {} held by {}", identity.uid(), holder.username),
            ));
        }
    }

    for group in identity.required_groups() {
        match reader.find_group_by_name(group)? {
            None => findings.push(Finding::new(
                CheckStatus::Fail,
                format!("group {} does not exist", group),
            )),
            Some(record) if record.has_member(username) => findings.push(Finding::new(
                CheckStatus::Pass,
                format!("member of {}", group),
            )),
            Some(_) => findings.push(Finding::new(
                CheckStatus::Fail,
                format!("not a member of {}", group),
            )),
        }
    }

    Ok(findings)
}

pub fn is_compliant(findings: &[Finding]) -> bool {
    findings.iter().all(|f| f.status != CheckStatus::Fail)
}
