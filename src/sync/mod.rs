//! Sync steps: copy pipeline output into the places the web app reads from.
//!
//! Every step reads from the pipeline output under the project root and
//! writes into `src/lib/data` or `static/visualization`. Targets whose
//! content already matches are left alone and reported as `unchanged`.

pub mod report;
pub mod bible_refs;
pub mod person_bios;
pub mod visualizations;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::config::ProjectLayout;
use crate::store::SourceError;

pub use report::{copy_file, write_file, SyncEntry, SyncReport, SyncStatus};
pub use bible_refs::{sync_bible_refs, BibleRefsSyncPayload};
pub use person_bios::sync_person_bios;
pub use visualizations::{sync_visualizations, WEB_EXTENSIONS};

/// Errors raised by sync steps.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A required input does not exist.
    #[error("missing input {path}")]
    MissingInput {
        /// Missing path.
        path: PathBuf,
    },
    /// Reading or writing failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// An input file could not be parsed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// Serializing a payload failed.
    #[error("failed to serialize payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Error for a failed read of a required input.
    pub(crate) fn input(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::MissingInput {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Error for a failed parse of a required input.
    pub(crate) fn parse(path: &Path, source: SourceError) -> Self {
        if source.is_not_found() {
            Self::MissingInput {
                path: path.to_path_buf(),
            }
        } else {
            Self::Source(source)
        }
    }
}

/// Which sync step to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncTarget {
    /// Reference payload.
    BibleRefs,
    /// Person biographies.
    PersonBios,
    /// Visualization assets and network files.
    Visualizations,
    /// All of the above, in that order.
    All,
}

impl SyncTarget {
    fn as_str(&self) -> &'static str {
        match self {
            Self::BibleRefs => "bible-refs",
            Self::PersonBios => "person-bios",
            Self::Visualizations => "visualizations",
            Self::All => "all",
        }
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bible-refs" => Ok(Self::BibleRefs),
            "person-bios" => Ok(Self::PersonBios),
            "visualizations" => Ok(Self::Visualizations),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown sync target '{}', expected bible-refs, person-bios, visualizations or all",
                other
            )),
        }
    }
}

/// Run one step, or all of them.
pub fn run(target: SyncTarget, layout: &ProjectLayout) -> Result<SyncReport, SyncError> {
    let report = match target {
        SyncTarget::BibleRefs => sync_bible_refs(layout)?,
        SyncTarget::PersonBios => sync_person_bios(layout)?,
        SyncTarget::Visualizations => sync_visualizations(layout)?,
        SyncTarget::All => {
            let mut report = sync_bible_refs(layout)?;
            report.merge(sync_person_bios(layout)?);
            report.merge(sync_visualizations(layout)?);
            report
        }
    };

    info!(
        %target,
        files = report.entries.len(),
        unchanged = report.count(SyncStatus::Unchanged),
        bytes = report.total_bytes(),
        "sync complete"
    );
    Ok(report)
}
