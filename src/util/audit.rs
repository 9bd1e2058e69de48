// ============================================================================
// src/util/audit.rs – Minimal append-only audit trail
// ============================================================================

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use tracing::debug;

use crate::config::Audit;

/// Timestamped event lines in a 0600 file. Never given codes or secrets.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: Option<PathBuf>,
}

impl AuditLog {
    pub fn from_config(cfg: &Audit) -> Self {
        Self {
            path: cfg.enabled.then(|| cfg.path.clone()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Append one event. Write failures are logged at debug and dropped.
    pub fn record(&self, event: &str, detail: &str) {
        let Some(path) = &self.path else {
            return;
        };
        let res = OpenOptions::new()
            .create(true)
            .append(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut file| {
                let ts = Local::now().format("%Y-%m-%d %H:%M:%S");
                writeln!(file, "[{ts}] {event}: {detail}")
            });
        if let Err(e) = res {
            debug!(path = %path.display(), error = %e, "audit write skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    #[test]
    fn appends_lines_with_private_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let log = AuditLog::from_config(&Audit {
            enabled: true,
            path: path.clone(),
        });

        log.record("OTP_ISSUED", "remaining=12");
        log.record("PROFILE_OPEN", "customized_profile");

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("OTP_ISSUED: remaining=12"));
        assert!(lines[1].starts_with('['));
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let log = AuditLog::from_config(&Audit {
            enabled: false,
            path: path.clone(),
        });
        log.record("OTP_ISSUED", "x");
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_ignored() {
        let dir = tempdir().unwrap();
        let log = AuditLog::from_config(&Audit {
            enabled: true,
            path: dir.path().join("missing").join("audit.log"),
        });
        log.record("OTP_ISSUED", "x");
    }
}
