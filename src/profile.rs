// ============================================================================
// src/profile.rs – Persistent browser profile directories
// ============================================================================
//! Each profile is a directory under one base directory that a browser
//! driver uses as its user-data dir, so cookies and sessions survive runs.
//! The manager only prepares and tracks those directories; starting the
//! browser itself belongs to the external driver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("invalid profile name {0:?}")]
    InvalidName(String),
    #[error("profile '{0}' already exists")]
    AlreadyExists(String),
    #[error("browser type must be either 'chromium' or 'firefox' (got '{0}')")]
    UnsupportedBrowser(BrowserKind),
    #[error("cannot use profile '{0}' while it is in use")]
    InUse(String),
    #[error("profile '{0}' not found")]
    NotFound(String),
    #[error("profile service error: {0}")]
    Service(String),
    #[error("malformed profile records in {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ProfileError {
    fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }

    /// Sub-directories a fresh profile of this kind starts with.
    fn skeleton(self) -> &'static [&'static str] {
        match self {
            BrowserKind::Chromium => &["Default"],
            BrowserKind::Firefox => &["cache", "extensions"],
            BrowserKind::Webkit => &[],
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" => Ok(BrowserKind::Webkit),
            other => Err(format!("unknown browser type '{other}'")),
        }
    }
}

type Registry = Arc<Mutex<BTreeSet<String>>>;

fn lock(registry: &Registry) -> MutexGuard<'_, BTreeSet<String>> {
    // A poisoned set of names is still a valid set of names.
    registry.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone)]
pub struct ProfileManager {
    base_dir: PathBuf,
    active: Registry,
}

impl ProfileManager {
    /// Root the manager at `base_dir`, creating it when missing.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, ProfileError> {
        let base = base_dir.as_ref();
        let base_dir = if base.is_absolute() {
            base.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| ProfileError::io("resolve working directory", e))?
                .join(base)
        };
        fs::create_dir_all(&base_dir)
            .map_err(|e| ProfileError::io(format!("create {}", base_dir.display()), e))?;
        Ok(Self {
            base_dir,
            active: Arc::default(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute directory for profile `name`. Does not touch the filesystem.
    pub fn profile_path(&self, name: &str) -> Result<PathBuf, ProfileError> {
        check_name(name)?;
        Ok(self.base_dir.join(name))
    }

    /// Create `<browser>_<name>` with the browser's starter layout.
    pub fn create_profile(
        &self,
        name: &str,
        overwrite: bool,
        browser: BrowserKind,
    ) -> Result<PathBuf, ProfileError> {
        if browser == BrowserKind::Webkit {
            return Err(ProfileError::UnsupportedBrowser(browser));
        }
        check_name(name)?;
        let dir_name = format!("{browser}_{name}");
        let path = self.profile_path(&dir_name)?;

        if path.exists() {
            if !overwrite {
                return Err(ProfileError::AlreadyExists(name.to_string()));
            }
            if self.is_open(&dir_name) {
                return Err(ProfileError::InUse(dir_name));
            }
            warn!(profile = %dir_name, "overwriting existing profile");
            fs::remove_dir_all(&path)
                .map_err(|e| ProfileError::io(format!("remove {}", path.display()), e))?;
        }

        fs::create_dir_all(&path)
            .map_err(|e| ProfileError::io(format!("create {}", path.display()), e))?;
        for sub in browser.skeleton() {
            let p = path.join(sub);
            fs::create_dir_all(&p)
                .map_err(|e| ProfileError::io(format!("create {}", p.display()), e))?;
        }

        info!(profile = %dir_name, browser = %browser, path = %path.display(), "created profile");
        Ok(path)
    }

    pub fn profile_exists(&self, name: &str) -> bool {
        self.profile_path(name).map(|p| p.is_dir()).unwrap_or(false)
    }

    /// Directory names under the base dir, sorted.
    pub fn list_profiles(&self) -> Result<Vec<String>, ProfileError> {
        let entries = match fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ProfileError::io(
                    format!("read {}", self.base_dir.display()),
                    e,
                ))
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| ProfileError::io(format!("read {}", self.base_dir.display()), e))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove a profile. `Ok(false)` when there was nothing to remove.
    pub fn delete_profile(&self, name: &str) -> Result<bool, ProfileError> {
        let path = self.profile_path(name)?;
        if !path.exists() {
            return Ok(false);
        }
        if self.is_open(name) {
            return Err(ProfileError::InUse(name.to_string()));
        }
        fs::remove_dir_all(&path)
            .map_err(|e| ProfileError::io(format!("remove {}", path.display()), e))?;
        info!(profile = %name, "deleted profile");
        Ok(true)
    }

    /// Prepare a profile for a browser session and mark it in use until the
    /// returned guard is dropped.
    pub fn open(&self, name: &str) -> Result<OpenProfile, ProfileError> {
        let path = self.profile_path(name)?;
        {
            let mut active = lock(&self.active);
            if active.contains(name) {
                return Err(ProfileError::InUse(name.to_string()));
            }
            fs::create_dir_all(&path)
                .map_err(|e| ProfileError::io(format!("create {}", path.display()), e))?;
            active.insert(name.to_string());
        }
        info!(profile = %name, "opened profile");
        Ok(OpenProfile {
            name: name.to_string(),
            path,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_open(&self, name: &str) -> bool {
        lock(&self.active).contains(name)
    }
}

/// A profile marked in use. Releases the mark on drop.
#[derive(Debug)]
pub struct OpenProfile {
    name: String,
    path: PathBuf,
    active: Registry,
}

impl OpenProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn close(self) {}
}

impl Drop for OpenProfile {
    fn drop(&mut self) {
        if lock(&self.active).remove(&self.name) {
            info!(profile = %self.name, "closed profile");
        }
    }
}

fn check_name(name: &str) -> Result<(), ProfileError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if bad {
        return Err(ProfileError::InvalidName(name.to_string()));
    }
    Ok(())
}
