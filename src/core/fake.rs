//! In-memory identity database for tests.
//!
//! Implements both [`IdentityReader`] and [`CommandExecutor`], following the
//! exit semantics of shadow-utils, and records every executor call.

use crate::core::executor::CommandExecutor;
use crate::core::reader::IdentityReader;
use crate::models::identity::{AccountRecord, GroupRecord, PasswordState};
use crate::models::outcome::{OperationOutcome, PasswordMarker};
use anyhow::{bail, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

const E_NOTFOUND: Option<i32> = Some(6);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeAccount {
    pub name: String,
    pub uid: u32,
    pub home: String,
    pub password: String,
}

#[derive(Debug, Default)]
struct State {
    accounts: Vec<FakeAccount>,
    groups: BTreeMap<String, BTreeSet<String>>,
    dirs: BTreeSet<String>,
    mutations: Vec<String>,
    broken_reads: bool,
    failing_creates: bool,
    failing_renames: bool,
    refused_unlocks: bool,
    ignored_group_adds: bool,
    hidden_password_state: bool,
    failing_password_marker: Option<PasswordMarker>,
    ignored_password_sets: bool,
}

impl State {
    fn account(&self, name: &str) -> Option<&FakeAccount> {
        self.accounts.iter().find(|a| a.name == name)
    }

    fn account_mut(&mut self, name: &str) -> Option<&mut FakeAccount> {
        self.accounts.iter_mut().find(|a| a.name == name)
    }
}

#[derive(Debug, Default)]
pub struct FakeDatabase {
    state: RefCell<State>,
}

fn home_of(name: &str) -> String {
    format!("/home/{}", name)
}

fn password_state(field: &str) -> PasswordState {
    if field.is_empty() {
        PasswordState::Empty
    } else if field.starts_with('!') || field.starts_with('*') {
        PasswordState::Locked
    } else {
        PasswordState::Set
    }
}

impl FakeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, name: &str, uid: u32, password: &str) {
        self.state.borrow_mut().accounts.push(FakeAccount {
            name: name.to_string(),
            uid,
            home: home_of(name),
            password: password.to_string(),
        });
    }

    pub fn remove_account(&self, name: &str) {
        self.state.borrow_mut().accounts.retain(|a| a.name != name);
    }

    pub fn set_password(&self, name: &str, password: &str) {
        if let Some(account) = self.state.borrow_mut().account_mut(name) {
            account.password = password.to_string();
        }
    }

    pub fn add_group(&self, name: &str, members: &[&str]) {
        self.state.borrow_mut().groups.insert(
            name.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
    }

    pub fn remove_group(&self, name: &str) {
        self.state.borrow_mut().groups.remove(name);
    }

    pub fn join_group(&self, user: &str, group: &str) {
        if let Some(members) = self.state.borrow_mut().groups.get_mut(group) {
            members.insert(user.to_string());
        }
    }

    pub fn leave_group(&self, user: &str, group: &str) {
        if let Some(members) = self.state.borrow_mut().groups.get_mut(group) {
            members.remove(user);
        }
    }

    pub fn add_dir(&self, path: &str) {
        self.state.borrow_mut().dirs.insert(path.to_string());
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.state.borrow().dirs.contains(path)
    }

    pub fn account(&self, name: &str) -> Option<FakeAccount> {
        self.state.borrow().account(name).cloned()
    }

    pub fn group_members(&self, group: &str) -> BTreeSet<String> {
        self.state
            .borrow()
            .groups
            .get(group)
            .cloned()
            .unwrap_or_default()
    }

    pub fn mutations(&self) -> Vec<String> {
        self.state.borrow().mutations.clone()
    }

    pub fn clear_mutations(&self) {
        self.state.borrow_mut().mutations.clear();
    }

    pub fn break_reads(&self) {
        self.state.borrow_mut().broken_reads = true;
    }

    pub fn fail_creates(&self) {
        self.state.borrow_mut().failing_creates = true;
    }

    pub fn fail_renames(&self) {
        self.state.borrow_mut().failing_renames = true;
    }

    /// Every unlock reports that no password is set.
    pub fn refuse_unlocks(&self) {
        self.state.borrow_mut().refused_unlocks = true;
    }

    /// Writing `marker` into a password field fails.
    pub fn fail_password_sets(&self, marker: PasswordMarker) {
        self.state.borrow_mut().failing_password_marker = Some(marker);
    }

    /// Password writes report success without changing anything.
    pub fn ignore_password_sets(&self) {
        self.state.borrow_mut().ignored_password_sets = true;
    }

    /// Password state reads as `Unknown`, like `passwd -S` run without root.
    pub fn hide_password_state(&self) {
        self.state.borrow_mut().hidden_password_state = true;
    }

    /// Group adds report success without changing anything.
    pub fn ignore_group_adds(&self) {
        self.state.borrow_mut().ignored_group_adds = true;
    }

    fn record(&self, mutation: String) {
        self.state.borrow_mut().mutations.push(mutation);
    }

    fn to_record(&self, account: &FakeAccount) -> AccountRecord {
        let password = if self.state.borrow().hidden_password_state {
            PasswordState::Unknown
        } else {
            password_state(&account.password)
        };
        AccountRecord {
            username: account.name.clone(),
            uid: account.uid,
            home_directory: PathBuf::from(&account.home),
            password,
        }
    }

    fn check_reads(&self) -> Result<()> {
        if self.state.borrow().broken_reads {
            bail!("cannot open /etc/passwd");
        }
        Ok(())
    }
}

impl IdentityReader for FakeDatabase {
    fn find_account_by_name(&self, name: &str) -> Result<Option<AccountRecord>> {
        self.check_reads()?;
        let account = self.state.borrow().account(name).cloned();
        Ok(account.map(|a| self.to_record(&a)))
    }

    fn find_account_by_uid(&self, uid: u32) -> Result<Option<AccountRecord>> {
        self.check_reads()?;
        let account = self
            .state
            .borrow()
            .accounts
            .iter()
            .find(|a| a.uid == uid)
            .cloned();
        Ok(account.map(|a| self.to_record(&a)))
    }

    fn find_group_by_name(&self, name: &str) -> Result<Option<GroupRecord>> {
        self.check_reads()?;
        Ok(self.state.borrow().groups.get(name).map(|members| GroupRecord {
            group_name: name.to_string(),
            members: members.clone(),
        }))
    }
}

impl CommandExecutor for FakeDatabase {
    fn create_account(
        &self,
        username: &str,
        uid: u32,
        bind_to_own_group: bool,
    ) -> Result<OperationOutcome> {
        self.record(format!(
            "useradd {} uid={} own_group={}",
            username, uid, bind_to_own_group
        ));
        let mut state = self.state.borrow_mut();
        if state.failing_creates {
            return Ok(OperationOutcome::OtherFailure(Some(1)));
        }
        if state.account(username).is_some() {
            return Ok(OperationOutcome::NameConflict);
        }
        let group_exists = state.groups.contains_key(username);
        if !bind_to_own_group && group_exists {
            return Ok(OperationOutcome::NameConflict);
        }
        if bind_to_own_group && !group_exists {
            return Ok(OperationOutcome::OtherFailure(E_NOTFOUND));
        }
        if state.accounts.iter().any(|a| a.uid == uid) {
            return Ok(OperationOutcome::UidConflict);
        }
        if !bind_to_own_group {
            state.groups.insert(username.to_string(), BTreeSet::new());
        }
        state.dirs.insert(home_of(username));
        state.accounts.push(FakeAccount {
            name: username.to_string(),
            uid,
            home: home_of(username),
            password: "!".to_string(),
        });
        Ok(OperationOutcome::Success)
    }

    fn rename_account(
        &self,
        old_name: &str,
        new_name: &str,
        relocate_home: bool,
    ) -> Result<OperationOutcome> {
        let new_home = home_of(new_name);
        let move_home = relocate_home && !self.has_dir(&new_home);
        let home_args = match (relocate_home, move_home) {
            (false, _) => String::new(),
            (true, false) => format!("-d {} ", new_home),
            (true, true) => format!("-d {} -m ", new_home),
        };
        self.record(format!("usermod {}-l {} {}", home_args, new_name, old_name));
        let mut state = self.state.borrow_mut();
        if state.failing_renames {
            return Ok(OperationOutcome::OtherFailure(Some(1)));
        }
        if state.account(new_name).is_some() {
            return Ok(OperationOutcome::NameConflict);
        }
        let Some(account) = state.account_mut(old_name) else {
            return Ok(OperationOutcome::OtherFailure(E_NOTFOUND));
        };
        let old_home = if relocate_home {
            std::mem::replace(&mut account.home, new_home.clone())
        } else {
            account.home.clone()
        };
        account.name = new_name.to_string();
        if move_home {
            state.dirs.remove(&old_home);
            state.dirs.insert(new_home);
        }
        for members in state.groups.values_mut() {
            if members.remove(old_name) {
                members.insert(new_name.to_string());
            }
        }
        Ok(OperationOutcome::Success)
    }

    fn set_password_state(
        &self,
        username: &str,
        marker: PasswordMarker,
    ) -> Result<OperationOutcome> {
        self.record(format!("usermod -p '{}' {}", marker.as_field(), username));
        let mut state = self.state.borrow_mut();
        if state.failing_password_marker == Some(marker) {
            return Ok(OperationOutcome::OtherFailure(Some(1)));
        }
        if state.ignored_password_sets {
            return Ok(OperationOutcome::Success);
        }
        match state.account_mut(username) {
            Some(account) => {
                account.password = marker.as_field().to_string();
                Ok(OperationOutcome::Success)
            }
            None => Ok(OperationOutcome::OtherFailure(E_NOTFOUND)),
        }
    }

    fn unlock_account(&self, username: &str) -> Result<OperationOutcome> {
        self.record(format!("passwd -u {}", username));
        let mut state = self.state.borrow_mut();
        if state.refused_unlocks {
            return Ok(OperationOutcome::PasswordMissing);
        }
        let Some(account) = state.account_mut(username) else {
            return Ok(OperationOutcome::OtherFailure(Some(1)));
        };
        if let Some(rest) = account.password.strip_prefix('!') {
            if rest.is_empty() {
                return Ok(OperationOutcome::PasswordMissing);
            }
            account.password = rest.to_string();
        }
        Ok(OperationOutcome::Success)
    }

    fn add_to_groups(&self, username: &str, groups: &BTreeSet<String>) -> Result<OperationOutcome> {
        let joined = groups.iter().cloned().collect::<Vec<_>>().join(",");
        self.record(format!("usermod -a -G {} {}", joined, username));
        let mut state = self.state.borrow_mut();
        if state.ignored_group_adds {
            return Ok(OperationOutcome::Success);
        }
        if groups.iter().any(|g| !state.groups.contains_key(g)) {
            return Ok(OperationOutcome::OtherFailure(E_NOTFOUND));
        }
        for group in groups {
            if let Some(members) = state.groups.get_mut(group) {
                members.insert(username.to_string());
            }
        }
        Ok(OperationOutcome::Success)
    }
}
