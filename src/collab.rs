// ============================================================================
// src/collab.rs – Seams to the profile service and the browser driver
// ============================================================================

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::profile::{BrowserKind, ProfileError};

/// One browser profile as the profile service describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub browser_type: BrowserKind,
    #[serde(default)]
    pub browser_version: Option<String>,
    #[serde(default)]
    pub raw_proxy: String,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub profile_path: Option<PathBuf>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response wrapper used by the profile service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEnvelope {
    pub success: bool,
    pub data: Option<ProfileRecord>,
    #[serde(default)]
    pub message: String,
}

/// Where profile records come from.
pub trait ProfileSource {
    fn get_profile(&self, id: &str) -> Result<ProfileRecord, ProfileError>;
}

/// Whatever types the code into the browser.
pub trait CodeSink {
    fn submit_code(&mut self, code: &str) -> anyhow::Result<()>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    Envelope(ProfileEnvelope),
    Many(Vec<ProfileRecord>),
    One(ProfileRecord),
}

/// Profile records from the config file plus an optional JSON file.
#[derive(Debug, Clone, Default)]
pub struct ConfigProfileSource {
    records: Vec<ProfileRecord>,
    // Set when the JSON file held a failed service envelope.
    service_error: Option<String>,
}

impl ConfigProfileSource {
    pub fn new(records: Vec<ProfileRecord>) -> Self {
        Self {
            records,
            service_error: None,
        }
    }

    /// Add the records found in a JSON file.
    pub fn with_file(mut self, path: &Path) -> Result<Self, ProfileError> {
        let text = fs::read_to_string(path).map_err(|e| ProfileError::Io {
            context: format!("read profile records {}", path.display()),
            source: e,
        })?;
        let parsed: RecordsFile =
            serde_json::from_str(&text).map_err(|e| ProfileError::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        match parsed {
            RecordsFile::Envelope(env) if env.success => self.records.extend(env.data),
            RecordsFile::Envelope(env) => self.service_error = Some(env.message),
            RecordsFile::Many(many) => self.records.extend(many),
            RecordsFile::One(one) => self.records.push(one),
        }
        debug!(count = self.records.len(), path = %path.display(), "loaded profile records");
        Ok(self)
    }

    pub fn records(&self) -> &[ProfileRecord] {
        &self.records
    }
}

impl ProfileSource for ConfigProfileSource {
    fn get_profile(&self, id: &str) -> Result<ProfileRecord, ProfileError> {
        if let Some(found) = self.records.iter().find(|r| r.id == id) {
            return Ok(found.clone());
        }
        match &self.service_error {
            Some(msg) => Err(ProfileError::Service(msg.clone())),
            None => Err(ProfileError::NotFound(id.to_string())),
        }
    }
}

/// Writes each code as one JSON line for a driver reading our stdout.
pub struct JsonLineSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> CodeSink for JsonLineSink<W> {
    fn submit_code(&mut self, code: &str) -> anyhow::Result<()> {
        let line = json!({
            "code": code,
            "submitted_at": Utc::now().to_rfc3339(),
        });
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ENVELOPE: &str = r#"{
        "success": true,
        "data": {
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "name": "customized_profile",
            "raw_proxy": "",
            "browser_type": "chromium",
            "browser_version": "120.0.6099.28",
            "group_id": "987fcdeb-51a2-3e4b-9876-543210fedcba",
            "note": "test profile",
            "created_at": "2024-10-20T10:30:00Z"
        },
        "message": "OK"
    }"#;

    fn record(id: &str, name: &str) -> ProfileRecord {
        ProfileRecord {
            id: id.into(),
            name: name.into(),
            browser_type: BrowserKind::Firefox,
            browser_version: None,
            raw_proxy: String::new(),
            group_id: None,
            profile_path: None,
            note: String::new(),
            created_at: None,
        }
    }

    #[test]
    fn finds_configured_record() {
        let src = ConfigProfileSource::new(vec![record("a", "alpha"), record("b", "beta")]);
        assert_eq!(src.get_profile("b").unwrap().name, "beta");
        assert!(matches!(src.get_profile("z"), Err(ProfileError::NotFound(_))));
    }

    #[test]
    fn reads_service_envelope() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(&path, ENVELOPE).unwrap();

        let src = ConfigProfileSource::default().with_file(&path).unwrap();
        let rec = src
            .get_profile("123e4567-e89b-12d3-a456-426614174000")
            .unwrap();
        assert_eq!(rec.name, "customized_profile");
        assert_eq!(rec.browser_type, BrowserKind::Chromium);
        assert_eq!(rec.browser_version.as_deref(), Some("120.0.6099.28"));
    }

    #[test]
    fn reads_record_arrays() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(
            &path,
            r#"[{"id": "1", "name": "one"}, {"id": "2", "name": "two", "browser_type": "firefox"}]"#,
        )
        .unwrap();

        let src = ConfigProfileSource::new(vec![record("0", "zero")])
            .with_file(&path)
            .unwrap();
        assert_eq!(src.records().len(), 3);
        assert_eq!(src.get_profile("2").unwrap().browser_type, BrowserKind::Firefox);
        assert_eq!(src.get_profile("1").unwrap().browser_type, BrowserKind::Chromium);
    }

    #[test]
    fn failed_envelope_surfaces_service_message() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(&path, r#"{"success": false, "data": null, "message": "profile locked"}"#)
            .unwrap();

        let src = ConfigProfileSource::default().with_file(&path).unwrap();
        match src.get_profile("anything") {
            Err(ProfileError::Service(msg)) => assert_eq!(msg, "profile locked"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ConfigProfileSource::default().with_file(&path),
            Err(ProfileError::Malformed { .. })
        ));
    }

    #[test]
    fn json_line_sink_writes_one_line_per_code() {
        let mut buf = Vec::new();
        let mut sink = JsonLineSink::new(&mut buf);
        sink.submit_code("123456").unwrap();
        sink.submit_code("654321").unwrap();
        drop(sink);

        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["code"], "123456");
        assert!(first["submitted_at"].as_str().is_some());
    }
}
