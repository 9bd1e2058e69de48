// ============================================================================
// src/cmd/code.rs – Show codes, normalized secrets and provisioning URIs
// ============================================================================

use anyhow::{Context, Result};

use crate::cmd::{resolve_secret, Ctx};
use crate::totp;
use crate::ui::render_qr;

pub struct CodeOptions {
    pub secret: Option<String>,
    pub at: Option<u64>,
    pub json: bool,
}

pub fn run_code(ctx: &Ctx, opts: CodeOptions) -> Result<()> {
    let secret = resolve_secret(opts.secret, &ctx.cfg)?;
    let otp = match opts.at {
        Some(t) => totp::generate_code_at(&secret, t),
        None => totp::generate_code(&secret),
    }
    .context("generate 2FA code")?;

    ctx.audit
        .record("OTP_ISSUED", &format!("remaining={}s", otp.remaining));

    if opts.json {
        println!("{}", serde_json::to_string(&otp)?);
        return Ok(());
    }
    ctx.ui.otp_panel(&otp, ctx.cfg.display.expiry_warning_secs);
    println!("{}", otp.code);
    Ok(())
}

pub fn run_normalize(ctx: &Ctx, secret: &str) -> Result<()> {
    let normalized = totp::normalize(secret)?;
    if totp::validate(&normalized) {
        ctx.ui.success("Secret decodes as base32.");
    } else {
        ctx.ui
            .warn("Secret normalizes but does not decode as base32; codes cannot be generated.");
    }
    println!("{normalized}");
    Ok(())
}

pub struct UriOptions {
    pub secret: Option<String>,
    pub account: Option<String>,
    pub issuer: Option<String>,
    pub qr: bool,
}

pub fn run_uri(ctx: &Ctx, opts: UriOptions) -> Result<()> {
    let secret = resolve_secret(opts.secret, &ctx.cfg)?;
    let account = opts
        .account
        .or_else(|| ctx.cfg.account.email.clone())
        .context("no account name; pass --account or set account.email")?;
    let issuer = opts.issuer.or_else(|| ctx.cfg.account.issuer.clone());

    let uri = totp::provisioning_uri(&secret, &account, issuer.as_deref())?;
    if opts.qr {
        match render_qr(&uri) {
            Some(art) => eprintln!("{art}"),
            None => ctx.ui.warn("URI too long to render as a QR code."),
        }
    }
    println!("{uri}");
    Ok(())
}
