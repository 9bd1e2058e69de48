// ============================================================================
// src/cmd/login.rs – Hand a fresh 2FA code to the browser driver
// ============================================================================

use anyhow::Result;
use std::io;

use crate::cmd::profile::{manager, source};
use crate::cmd::{resolve_secret, Ctx};
use crate::collab::JsonLineSink;
use crate::session::LoginSession;

pub struct LoginOptions {
    pub profile_id: String,
    pub secret: Option<String>,
    pub at: Option<u64>,
}

/// Resolve and open the profile, then emit the code as a JSON line on
/// stdout for the driver that types it into the sign-in page.
pub fn run_login(ctx: &Ctx, opts: LoginOptions) -> Result<()> {
    ctx.ui.banner("mailgate // sign-in");
    let secret = resolve_secret(opts.secret, &ctx.cfg)?;
    let src = source(ctx)?;
    let mgr = manager(ctx)?;
    let mut sink = JsonLineSink::new(io::stdout().lock());

    let mut session = LoginSession::new(&src, &mgr, &mut sink);
    session.min_remaining = ctx.cfg.display.min_remaining_secs;

    let outcome = match session.run(&opts.profile_id, &secret, opts.at) {
        Ok(outcome) => outcome,
        Err(e) => {
            ctx.audit
                .record("LOGIN_FAIL", &format!("profile={}", opts.profile_id));
            return Err(e);
        }
    };

    ctx.audit.record(
        "LOGIN_CODE_SUBMITTED",
        &format!(
            "profile={} remaining={}s",
            outcome.profile.name, outcome.remaining
        ),
    );
    ctx.ui.data_panel(
        "Sign-in",
        &[
            ("Profile", outcome.open.name().to_string()),
            ("Browser", outcome.profile.browser_type.to_string()),
            ("Profile dir", outcome.open.path().display().to_string()),
            ("Code valid for", format!("{}s", outcome.remaining)),
        ],
    );
    if let Some(email) = &ctx.cfg.account.email {
        ctx.ui.note(&format!("Account: {email}"));
    }
    outcome.open.close();
    Ok(())
}
