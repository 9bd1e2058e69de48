// ============================================================================
// src/config.rs – TOML/YAML config loader with per-section defaults
// ============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::collab::ProfileRecord;
use crate::profile::BrowserKind;

pub const DEFAULT_CONFIG_PATH: &str = "mailgate.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub email: Option<String>,
    /// Base32 TOTP secret in whatever form the provider showed it.
    #[serde(default)]
    pub two_fa_secret: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profiles {
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    #[serde(default)]
    pub default_browser: BrowserKind,
    /// JSON file with profile records (service envelope, one record, or a list).
    #[serde(default)]
    pub records_file: Option<PathBuf>,
    #[serde(default)]
    pub records: Vec<ProfileRecord>,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("browser_profiles")
}

impl Default for Profiles {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            default_browser: BrowserKind::default(),
            records_file: None,
            records: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audit {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("mailgate-audit.log")
}

impl Default for Audit {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_audit_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Display {
    /// Warn when a shown code has this many seconds or fewer left.
    #[serde(default = "default_expiry_warning_secs")]
    pub expiry_warning_secs: u64,
    /// `login` waits for the next window below this many seconds.
    #[serde(default = "default_min_remaining_secs")]
    pub min_remaining_secs: u64,
}

fn default_expiry_warning_secs() -> u64 {
    5
}

fn default_min_remaining_secs() -> u64 {
    5
}

impl Default for Display {
    fn default() -> Self {
        Self {
            expiry_warning_secs: default_expiry_warning_secs(),
            min_remaining_secs: default_min_remaining_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: Account,
    #[serde(default)]
    pub profiles: Profiles,
    #[serde(default)]
    pub audit: Audit,
    #[serde(default)]
    pub display: Display,
}

impl Config {
    pub fn load<P: AsRef<Path>>(p: P) -> Result<Self> {
        let s = fs::read_to_string(&p)
            .with_context(|| format!("read config: {}", p.as_ref().display()))?;
        let cfg: Self = match p.as_ref().extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&s).context("yaml parse")?,
            _ => toml::from_str(&s).context("toml parse")?,
        };
        Ok(cfg)
    }

    /// Load `explicit` if given (must exist), else the default path if it
    /// exists, else built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(p) => Self::load(p),
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    /// Starter config written by `mailgate config init`.
    pub fn sample() -> Self {
        Self {
            account: Account {
                email: Some("user@example.com".to_string()),
                two_fa_secret: None,
                issuer: Some("Mail".to_string()),
            },
            ..Self::default()
        }
    }
}
