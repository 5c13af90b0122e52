// 💾 Writer - whole-file JSON snapshots for the static site
//
// Both files are replaced via temp file + rename.

use crate::mapper::Signal;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::debug;

// ============================================================================
// STATUS RECORD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Stale,
}

/// Contents of the meta file; exactly one exists and it is rewritten every run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: Status,

    /// RFC 3339, UTC, second precision
    pub updated_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// URL that was requested this run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Hex SHA-256 of the signals file written this run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl StatusRecord {
    pub fn ok(at: DateTime<Utc>, records: usize, sha256: String) -> Self {
        StatusRecord {
            status: Status::Ok,
            updated_at: format_timestamp(at),
            records: Some(records),
            note: None,
            source: None,
            sha256: Some(sha256),
        }
    }

    pub fn stale(at: DateTime<Utc>, note: impl Into<String>) -> Self {
        StatusRecord {
            status: Status::Stale,
            updated_at: format_timestamp(at),
            records: None,
            note: Some(note.into()),
            source: None,
            sha256: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

// ============================================================================
// FILE OPERATIONS
// ============================================================================

/// Create the output directory (and parents) if missing
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
}

/// Write bytes next to `path` then rename over it
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Output path has no file name: {}", path.display()))?;
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    fs::write(&tmp, bytes)
        .with_context(|| format!("Failed to write temp file: {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp.display(),
                path.display()
            )
        });
    }

    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Pretty JSON with two-space indent and trailing newline
fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value).context("Failed to serialize JSON")?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Replace the signals file; returns the digest of what was written
pub fn write_signals(path: &Path, signals: &[Signal]) -> Result<String> {
    let bytes = to_json_bytes(signals)?;
    write_atomic(path, &bytes)?;
    Ok(sha256_hex(&bytes))
}

pub fn write_status(path: &Path, record: &StatusRecord) -> Result<()> {
    let bytes = to_json_bytes(record)?;
    write_atomic(path, &bytes)
}

pub fn read_status(path: &Path) -> Result<StatusRecord> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read status file: {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse status JSON")
}

// ============================================================================
// TESTS
// ============================================================================
