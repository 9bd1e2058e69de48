// ============================================================================
// src/totp/generator.rs – HMAC-SHA1 TOTP derivation (RFC 4226 / RFC 6238)
// ============================================================================

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::secret::{decode, normalize, validate};
use super::TotpError;

/// Width of one code window in seconds.
pub const STEP_SECS: u64 = 30;
/// Digits per code.
pub const DIGITS: usize = 6;

const MODULUS: u32 = 1_000_000;

/// A freshly derived code. Valid only for the step it was computed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpResult {
    pub code: String,
    /// Seconds until the code rotates, in `1..=30`.
    pub remaining: u64,
    #[serde(skip_serializing)]
    pub normalized_secret: String,
}

impl OtpResult {
    /// Authenticator-style rendering, `"123 456"`.
    pub fn display_code(&self) -> String {
        if self.code.len() == DIGITS {
            format!("{} {}", &self.code[..3], &self.code[3..])
        } else {
            self.code.clone()
        }
    }
}

/// Derive the code for the current wall-clock time.
pub fn generate_code(secret: &str) -> Result<OtpResult, TotpError> {
    generate_code_at(secret, unix_now())
}

/// Derive the code for an explicit unix timestamp.
pub fn generate_code_at(secret: &str, unix_secs: u64) -> Result<OtpResult, TotpError> {
    let normalized = normalize(secret)?;
    if !validate(&normalized) {
        return Err(TotpError::InvalidSecret);
    }
    let key = decode(&normalized)?;

    let counter = unix_secs / STEP_SECS;
    let code = hotp(&key, counter)?;
    let remaining = STEP_SECS - (unix_secs % STEP_SECS);
    debug!(counter, remaining, "derived totp code");

    Ok(OtpResult {
        code,
        remaining,
        normalized_secret: normalized,
    })
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn hotp(key: &[u8], counter: u64) -> Result<String, TotpError> {
    let mut mac =
        Hmac::<Sha1>::new_from_slice(key).map_err(|_| TotpError::InvalidSecret)?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(format!(
        "{:0width$}",
        truncate(&digest) % MODULUS,
        width = DIGITS
    ))
}

/// Dynamic truncation, RFC 4226 §5.3.
fn truncate(digest: &[u8]) -> u32 {
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ])
}
