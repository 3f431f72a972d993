//! Bring the deck user into compliance.

use crate::cli::CliContext;
use crate::core::executor::{CommandExecutor, SystemExecutor};
use crate::core::reader::{IdentityReader, SystemReader};
use crate::core::reconcile::Reconciler;
use crate::models::identity::DesiredIdentity;
use anyhow::Result;

pub fn run(ctx: &CliContext) -> Result<()> {
    ensure(&ctx.identity, &SystemReader, &SystemExecutor::default())
}

/// Ensure the account, then its group memberships. No rollback is attempted
/// on failure; a later run picks up from whatever state was left behind.
pub fn ensure<R: IdentityReader, E: CommandExecutor>(
    identity: &DesiredIdentity,
    reader: &R,
    executor: &E,
) -> Result<()> {
    let reconciler = Reconciler::new(identity, reader, executor);
    reconciler.ensure_account()?;
    reconciler.ensure_group_membership()?;
    tracing::info!("User {} is in place", identity);
    Ok(())
}
