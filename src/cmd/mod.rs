// ============================================================================
// src/cmd/mod.rs – command subsystem root
// ============================================================================
pub mod code; // mailgate code | normalize | uri
pub mod login; // mailgate login
pub mod profile; // mailgate profile ...
pub mod setup; // mailgate config init

use anyhow::{bail, Context, Result};
use dialoguer::Password;
use zeroize::Zeroizing;

use crate::config::Config;
use crate::ui::UX;
use crate::util::audit::AuditLog;

/// Everything a command handler needs besides its own arguments.
pub struct Ctx {
    pub ui: UX,
    pub cfg: Config,
    pub audit: AuditLog,
}

/// Secret precedence: explicit argument (or `MAILGATE_TOTP_SECRET`), then
/// `account.two_fa_secret`, then a hidden prompt on an attended terminal.
pub fn resolve_secret(arg: Option<String>, cfg: &Config) -> Result<Zeroizing<String>> {
    if let Some(s) = arg.filter(|s| !s.trim().is_empty()) {
        return Ok(Zeroizing::new(s));
    }
    if let Some(s) = cfg
        .account
        .two_fa_secret
        .as_ref()
        .filter(|s| !s.trim().is_empty())
    {
        return Ok(Zeroizing::new(s.clone()));
    }
    if !console::user_attended_stderr() {
        bail!("no 2FA secret given; pass it as an argument, set MAILGATE_TOTP_SECRET, or set account.two_fa_secret");
    }
    let entered = Password::new()
        .with_prompt("2FA secret")
        .allow_empty_password(false)
        .interact()
        .context("read 2FA secret")?;
    Ok(Zeroizing::new(entered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_wins_over_config() {
        let mut cfg = Config::default();
        cfg.account.two_fa_secret = Some("CONFIGSECRET".into());
        let s = resolve_secret(Some("ARGSECRET".into()), &cfg).unwrap();
        assert_eq!(s.as_str(), "ARGSECRET");
    }

    #[test]
    fn falls_back_to_config() {
        let mut cfg = Config::default();
        cfg.account.two_fa_secret = Some("jbsw y3dp".into());
        let s = resolve_secret(Some("   ".into()), &cfg).unwrap();
        assert_eq!(s.as_str(), "jbsw y3dp");
    }
}
