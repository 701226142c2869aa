//! Project layout: where pipeline artifacts live and where the web app expects them.
//!
//! All paths are relative to a project root. Defaults follow the web app's
//! layout; a JSON file can override any subset of them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors raised while loading a layout override.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The override file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The override file is not valid JSON.
    #[error("invalid config {path}: {source}")]
    Json {
        /// Path of the file.
        path: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Relative locations of every input and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasPaths {
    /// Pipeline output directory.
    pub pipeline_output: PathBuf,
    /// Reference detector output (one record per line).
    pub bible_refs_jsonl: PathBuf,
    /// Reference detector summary carrying `generated_on`.
    pub bible_index: PathBuf,
    /// Synced reference payload read by the web app.
    pub bible_refs_payload: PathBuf,
    /// Document metadata.
    pub metadata: PathBuf,
    /// Person biographies as produced by the pipeline.
    pub person_bios_source: PathBuf,
    /// Synced person biographies.
    pub person_bios: PathBuf,
    /// Register with geo and normdata enrichment.
    pub register_geo: PathBuf,
    /// Exported network graphs.
    pub networks_dir: PathBuf,
    /// Visualization web assets (html/css/js).
    pub visualization_source: PathBuf,
    /// Static directory the visualizations are served from.
    pub visualization_target: PathBuf,
}

impl Default for AtlasPaths {
    fn default() -> Self {
        Self {
            pipeline_output: "data_processing/output".into(),
            bible_refs_jsonl: "data_processing/output/bible_refs.jsonl".into(),
            bible_index: "data_processing/output/bible_index.json".into(),
            bible_refs_payload: "src/lib/data/aco-bible-refs.json".into(),
            metadata: "src/lib/data/aco-metadata.json".into(),
            person_bios_source: "data_processing/output/person_bios_a.json".into(),
            person_bios: "src/lib/data/aco-person-bios-a.json".into(),
            register_geo: "data_processing/output/register_geo.json".into(),
            networks_dir: "data_processing/output/networks".into(),
            visualization_source: "data_processing/visualization".into(),
            visualization_target: "static/visualization".into(),
        }
    }
}

impl AtlasPaths {
    /// Load overrides from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

/// A project root plus its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    paths: AtlasPaths,
}

impl ProjectLayout {
    /// Default layout under a root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_paths(root, AtlasPaths::default())
    }

    /// Custom layout under a root.
    pub fn with_paths(root: impl Into<PathBuf>, paths: AtlasPaths) -> Self {
        Self {
            root: root.into(),
            paths,
        }
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative layout.
    pub fn paths(&self) -> &AtlasPaths {
        &self.paths
    }

    /// Resolve a relative path against the root. Absolute paths pass through.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Path relative to the root for logs and reports.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    /// Absolute path of a named network file.
    pub fn network(&self, name: &str) -> PathBuf {
        self.resolve(&self.paths.networks_dir).join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let paths: AtlasPaths =
            serde_json::from_str(r#"{"metadata":"meta/docs.json"}"#).unwrap();
        assert_eq!(paths.metadata, PathBuf::from("meta/docs.json"));
        assert_eq!(paths.bible_refs_jsonl, AtlasPaths::default().bible_refs_jsonl);
    }

    #[test]
    fn test_resolve_and_display() {
        let layout = ProjectLayout::new("/srv/aco");
        let full = layout.resolve(&layout.paths().metadata);
        assert_eq!(full, PathBuf::from("/srv/aco/src/lib/data/aco-metadata.json"));
        assert_eq!(layout.display_path(&full), "src/lib/data/aco-metadata.json");
        assert_eq!(
            layout.network("bible_document.json"),
            PathBuf::from("/srv/aco/data_processing/output/networks/bible_document.json")
        );
    }
}
