//! CLI routing and command dispatch.

use crate::constants;
use crate::models::identity::DesiredIdentity;
use crate::util::journald::{self, RunRecord};
use crate::util::{logging, privilege};
use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod check;
pub mod ensure;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub identity: DesiredIdentity,
    pub journald: bool,
}

impl CliContext {
    /// Forward the outcome of a run to journald when enabled.
    pub fn report(&self, action: &str, result: &Result<()>) {
        if !self.journald {
            return;
        }
        let error = result.as_ref().err().map(|e| format!("{:#}", e));
        let record = RunRecord::new(action, self.identity.username(), error);
        journald::forward_record(constants::JOURNALD_TAG, &record);
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "steamos-ensure-deck-user",
    version,
    about = "Make sure the deck user exists, is usable, and is in the expected groups"
)]
pub struct Cli {
    /// Forward the run outcome to journald
    #[arg(long, global = true, env = "ENSURE_DECK_USER_JOURNALD")]
    pub journald: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        logging::init();

        let ctx = CliContext {
            identity: DesiredIdentity::steam_deck(),
            journald: self.journald,
        };
        let command = self.command.unwrap_or(Commands::Ensure);

        // Nothing may touch the identity database without root.
        if command.requires_root() {
            let gate = privilege::require_root(command.name());
            if gate.is_err() {
                ctx.report(command.name(), &gate);
            }
            gate?;
        }

        let result = match command {
            Commands::Ensure => ensure::run(&ctx),
            Commands::Check => check::run(&ctx),
        };
        ctx.report(command.name(), &result);
        result
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Repair the deck user (default when no subcommand is given)
    Ensure,
    /// Report compliance without changing anything (safe, read-only)
    Check,
}

impl Commands {
    /// Whether this command requires root privileges.
    pub fn requires_root(&self) -> bool {
        matches!(self, Commands::Ensure)
    }

    /// Command name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Ensure => "ensure",
            Commands::Check => "check",
        }
    }
}
