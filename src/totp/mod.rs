// ============================================================================
// src/totp/mod.rs – RFC 6238 one-time codes from hand-typed secrets
// ============================================================================

pub mod generator;
pub mod secret;
pub mod uri;

pub use generator::{generate_code, generate_code_at, OtpResult, STEP_SECS};
pub use secret::{normalize, validate};
pub use uri::provisioning_uri;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TotpError {
    /// Something other than `A-Z2-7` survived separator stripping.
    #[error("invalid 2FA secret: contains characters outside the base32 alphabet (A-Z, 2-7)")]
    InvalidFormat,
    /// The normalized secret does not decode as base32.
    #[error("invalid 2FA secret: could not decode as base32")]
    InvalidSecret,
}
