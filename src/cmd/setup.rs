// ============================================================================
// src/cmd/setup.rs – Write a starter config file
// ============================================================================

use anyhow::Result;
use std::path::Path;

use crate::cmd::Ctx;
use crate::config::Config;
use crate::util::atomic::atomic_write_toml;

pub fn run_config_init(ctx: &Ctx, path: &Path, force: bool) -> Result<()> {
    atomic_write_toml(path, &Config::sample(), force)?;
    ctx.ui
        .success(&format!("Wrote {} (mode 0600).", path.display()));
    ctx.ui.note("Set account.two_fa_secret or export MAILGATE_TOTP_SECRET.");
    Ok(())
}
