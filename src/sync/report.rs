//! Sync reports and the file helpers that produce their entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::config::ProjectLayout;
use crate::digest::{existing_digest, sha256_hex};
use super::SyncError;

/// What happened to a target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Copied byte-for-byte from a source file.
    Copied,
    /// Target already had identical content.
    Unchanged,
    /// Generated content was written.
    Written,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copied => write!(f, "copied"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Written => write!(f, "written"),
        }
    }
}

/// One target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEntry {
    /// Target path relative to the project root.
    pub path: String,
    /// Size in bytes.
    pub bytes: u64,
    /// SHA-256 of the content.
    pub sha256: String,
    /// Outcome.
    pub status: SyncStatus,
}

/// Outcome of one or more sync steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Target files in the order they were handled.
    pub entries: Vec<SyncEntry>,
}

impl SyncReport {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry.
    pub fn push(&mut self, entry: SyncEntry) {
        self.entries.push(entry);
    }

    /// Append another report's entries.
    pub fn merge(&mut self, other: SyncReport) {
        self.entries.extend(other.entries);
    }

    /// Number of entries with a status.
    pub fn count(&self, status: SyncStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// Bytes across all entries.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.bytes).sum()
    }

    /// Entry for a target path.
    pub fn get(&self, path: &str) -> Option<&SyncEntry> {
        self.entries.iter().find(|e| e.path == path)
    }
}

fn ensure_parent(dest: &Path) -> Result<(), SyncError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SyncError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn store(
    layout: &ProjectLayout,
    dest: &Path,
    bytes: &[u8],
    changed: SyncStatus,
) -> Result<SyncEntry, SyncError> {
    let sha256 = sha256_hex(bytes);
    let existing = existing_digest(dest).map_err(|source| SyncError::Io {
        path: dest.to_path_buf(),
        source,
    })?;

    let status = if existing.as_deref() == Some(sha256.as_str()) {
        SyncStatus::Unchanged
    } else {
        ensure_parent(dest)?;
        std::fs::write(dest, bytes).map_err(|source| SyncError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        changed
    };

    let path = layout.display_path(dest);
    debug!(%path, %status, bytes = bytes.len(), "synced file");
    Ok(SyncEntry {
        path,
        bytes: bytes.len() as u64,
        sha256,
        status,
    })
}

/// Copy `src` to `dest`, skipping the write when the content already matches.
pub fn copy_file(layout: &ProjectLayout, src: &Path, dest: &Path) -> Result<SyncEntry, SyncError> {
    let bytes = std::fs::read(src).map_err(|source| SyncError::input(src, source))?;
    store(layout, dest, &bytes, SyncStatus::Copied)
}

/// Write generated content to `dest`, skipping the write when it already matches.
pub fn write_file(layout: &ProjectLayout, dest: &Path, bytes: &[u8]) -> Result<SyncEntry, SyncError> {
    store(layout, dest, bytes, SyncStatus::Written)
}
