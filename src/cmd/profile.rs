// ============================================================================
// src/cmd/profile.rs – Browser profile directory commands
// ============================================================================

use anyhow::{Context, Result};

use crate::cmd::Ctx;
use crate::collab::{ConfigProfileSource, ProfileSource};
use crate::profile::{BrowserKind, ProfileManager};

pub fn manager(ctx: &Ctx) -> Result<ProfileManager> {
    ProfileManager::new(&ctx.cfg.profiles.base_dir).with_context(|| {
        format!(
            "prepare profile directory {}",
            ctx.cfg.profiles.base_dir.display()
        )
    })
}

/// Records from `[[profiles.records]]` plus `profiles.records_file`.
pub fn source(ctx: &Ctx) -> Result<ConfigProfileSource> {
    let src = ConfigProfileSource::new(ctx.cfg.profiles.records.clone());
    match &ctx.cfg.profiles.records_file {
        Some(path) => Ok(src.with_file(path)?),
        None => Ok(src),
    }
}

pub fn run_create(
    ctx: &Ctx,
    name: &str,
    browser: Option<BrowserKind>,
    overwrite: bool,
) -> Result<()> {
    let mgr = manager(ctx)?;
    let browser = browser.unwrap_or(ctx.cfg.profiles.default_browser);
    let path = mgr.create_profile(name, overwrite, browser)?;
    ctx.audit
        .record("PROFILE_CREATE", &format!("{browser} {name}"));
    ctx.ui
        .success(&format!("Created {browser} profile '{name}'."));
    println!("{}", path.display());
    Ok(())
}

pub fn run_list(ctx: &Ctx) -> Result<()> {
    let mgr = manager(ctx)?;
    let names = mgr.list_profiles()?;
    if names.is_empty() {
        ctx.ui.note(&format!(
            "No profiles under {}.",
            mgr.base_dir().display()
        ));
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

pub fn run_path(ctx: &Ctx, name: &str) -> Result<()> {
    let mgr = manager(ctx)?;
    let path = mgr.profile_path(name)?;
    if !mgr.profile_exists(name) {
        ctx.ui.warn(&format!("Profile '{name}' does not exist yet."));
    }
    println!("{}", path.display());
    Ok(())
}

pub fn run_delete(ctx: &Ctx, name: &str) -> Result<()> {
    let mgr = manager(ctx)?;
    if mgr.delete_profile(name)? {
        ctx.audit.record("PROFILE_DELETE", name);
        ctx.ui.success(&format!("Deleted profile '{name}'."));
    } else {
        ctx.ui.warn(&format!("No profile named '{name}'."));
    }
    Ok(())
}

pub fn run_show(ctx: &Ctx, id: &str) -> Result<()> {
    let src = source(ctx)?;
    let record = match src.get_profile(id) {
        Ok(record) => record,
        Err(e) => {
            let known: Vec<&str> = src.records().iter().map(|r| r.id.as_str()).collect();
            if !known.is_empty() {
                ctx.ui
                    .note(&format!("Known profile ids: {}", known.join(", ")));
            }
            return Err(e.into());
        }
    };
    let mgr = manager(ctx)?;
    let local = mgr.profile_path(&record.name)?;

    ctx.ui.data_panel(
        "Profile",
        &[
            ("Id", record.id.clone()),
            ("Name", record.name.clone()),
            ("Browser", record.browser_type.to_string()),
            (
                "Version",
                record.browser_version.clone().unwrap_or_else(|| "-".into()),
            ),
            ("Local dir", local.display().to_string()),
            ("On disk", mgr.profile_exists(&record.name).to_string()),
        ],
    );
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
