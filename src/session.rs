// ============================================================================
// src/session.rs – Second-factor hand-off for one sign-in run
// ============================================================================
//! Resolves the profile record, opens its persistent directory, derives a
//! code with enough validity left, and gives it to the browser driver.

use anyhow::{Context, Result};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::collab::{CodeSink, ProfileRecord, ProfileSource};
use crate::profile::{OpenProfile, ProfileManager};
use crate::totp::{self, generator::unix_now};

pub trait Clock {
    fn now(&self) -> u64;
    fn sleep(&self, secs: u64);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        unix_now()
    }

    fn sleep(&self, secs: u64) {
        thread::sleep(Duration::from_secs(secs));
    }
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub profile: ProfileRecord,
    /// Keeps the profile marked in use for as long as the caller holds it.
    pub open: OpenProfile,
    pub remaining: u64,
}

pub struct LoginSession<'a, S, K, C = SystemClock> {
    source: &'a S,
    manager: &'a ProfileManager,
    sink: &'a mut K,
    clock: C,
    /// Codes with fewer seconds left than this are skipped for the next one.
    pub min_remaining: u64,
}

impl<'a, S: ProfileSource, K: CodeSink> LoginSession<'a, S, K> {
    pub fn new(source: &'a S, manager: &'a ProfileManager, sink: &'a mut K) -> Self {
        Self::with_clock(source, manager, sink, SystemClock)
    }
}

impl<'a, S: ProfileSource, K: CodeSink, C: Clock> LoginSession<'a, S, K, C> {
    pub fn with_clock(
        source: &'a S,
        manager: &'a ProfileManager,
        sink: &'a mut K,
        clock: C,
    ) -> Self {
        Self {
            source,
            manager,
            sink,
            clock,
            min_remaining: 0,
        }
    }

    /// Run the hand-off. `at` pins the clock and disables waiting.
    pub fn run(&mut self, profile_id: &str, secret: &str, at: Option<u64>) -> Result<LoginOutcome> {
        let profile = self
            .source
            .get_profile(profile_id)
            .with_context(|| format!("resolve profile {profile_id}"))?;
        let open = self
            .manager
            .open(&profile.name)
            .with_context(|| format!("open profile {}", profile.name))?;

        let mut otp = match at {
            Some(t) => totp::generate_code_at(secret, t)?,
            None => totp::generate_code_at(secret, self.clock.now())?,
        };
        if at.is_none() && otp.remaining < self.min_remaining {
            warn!(
                remaining = otp.remaining,
                "code about to rotate; waiting for the next window"
            );
            self.clock.sleep(otp.remaining);
            otp = totp::generate_code_at(secret, self.clock.now())?;
        }

        self.sink
            .submit_code(&otp.code)
            .context("submit verification code")?;
        info!(profile = %profile.name, remaining = otp.remaining, "submitted verification code");

        Ok(LoginOutcome {
            profile,
            open,
            remaining: otp.remaining,
        })
    }
}
