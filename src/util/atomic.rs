// ============================================================================
// src/util/atomic.rs – Durable, permissioned atomic writes (config files)
// ============================================================================

use anyhow::{bail, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn fsync_dir(dir: &Path) -> Result<()> {
    let f = File::open(dir).with_context(|| format!("open dir for fsync: {}", dir.display()))?;
    f.sync_all()
        .with_context(|| format!("fsync dir failed: {}", dir.display()))
}

fn reject_symlink_target(path: &Path) -> Result<()> {
    if let Ok(meta) = fs::symlink_metadata(path) {
        if meta.file_type().is_symlink() {
            bail!("refusing to write to symlink: {}", path.display());
        }
    }
    Ok(())
}

/// Write `bytes` to a sibling temp file, fsync, rename over `path`, then
/// fsync the directory. `mode` is applied exactly, regardless of umask.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8], mode: u32, force: bool) -> Result<()> {
    reject_symlink_target(path)?;
    if !force && path.exists() {
        bail!(
            "file already exists (use --force to overwrite): {}",
            path.display()
        );
    }

    let dir = parent_dir(path);
    fs::create_dir_all(&dir)
        .with_context(|| format!("create parent directory: {}", dir.display()))?;

    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("target path has no file name")?;
    let tmp = dir.join(format!(".{base}.tmp-{}", nanoid::nanoid!(8)));

    let mut f = OpenOptions::new()
        .create_new(true)
        .write(true)
        .mode(mode)
        .open(&tmp)
        .with_context(|| format!("open temp file: {}", tmp.display()))?;
    let written = f
        .write_all(bytes)
        .and_then(|_| f.sync_all())
        .context("write temp file");
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path).with_context(|| {
        format!("atomic rename failed ({} -> {})", tmp.display(), path.display())
    })?;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("set permissions on {}", path.display()))?;
    fsync_dir(&dir)
}

/// Serialize `value` as TOML and write it with 0600 permissions.
pub fn atomic_write_toml<T: serde::Serialize>(path: &Path, value: &T, force: bool) -> Result<()> {
    let s = toml::to_string_pretty(value).context("serialize TOML")?;
    atomic_write_bytes(path, s.as_bytes(), 0o600, force)
}
