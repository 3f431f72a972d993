//! Read-only compliance report.

use crate::cli::CliContext;
use crate::core::compliance::{self, CheckStatus};
use crate::core::reader::SystemReader;
use anyhow::{bail, Result};

pub fn run(ctx: &CliContext) -> Result<()> {
    let findings = compliance::assess(&ctx.identity, &SystemReader)?;

    println!("Check: {}", ctx.identity);
    for finding in &findings {
        println!("  [{}] {}", finding.status, finding.message);
    }

    let count = |status: CheckStatus| findings.iter().filter(|f| f.status == status).count();
    println!();
    println!(
        "Check summary: {} pass, {} warn, {} fail",
        count(CheckStatus::Pass),
        count(CheckStatus::Warn),
        count(CheckStatus::Fail)
    );

    if !compliance::is_compliant(&findings) {
        bail!("user {} is not compliant", ctx.identity.username());
    }
    Ok(())
}
