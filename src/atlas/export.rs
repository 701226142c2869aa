//! Write every page plus a manifest into an output directory.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::normalizer::OsisNormalizer;
use crate::store::CorpusSource;
use super::{AtlasBundler, AtlasManifest, AtlasPages, BundleError, ExportPaths, LoadError};

/// Export failure.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A page could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Writing an artifact failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Artifact path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Serializing an artifact failed.
    #[error("failed to serialize artifact: {0}")]
    Json(#[from] serde_json::Error),
    /// The manifest is incomplete.
    #[error("manifest: {0}")]
    Bundle(#[from] BundleError),
}

/// Write a value as pretty JSON with a trailing newline.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<usize, ExportError> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, &bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(bytes.len())
}

/// Write already loaded pages and their manifest.
pub fn write_pages(
    pages: &AtlasPages,
    normalizer: &OsisNormalizer,
    out_dir: &Path,
    paths: &ExportPaths,
) -> Result<AtlasManifest, ExportError> {
    write_json_pretty(&out_dir.join(&paths.bibelstellen), &pages.bible_index)?;
    write_json_pretty(&out_dir.join(&paths.register), &pages.register)?;
    for (level, graph) in &pages.sankey {
        write_json_pretty(&out_dir.join(paths.sankey(*level)), graph)?;
    }
    write_json_pretty(&out_dir.join(&paths.audit), &pages.audit)?;

    let mut bundler = AtlasBundler::new()
        .with_paths(paths.clone())
        .canon(normalizer.canon())
        .bible_index(&pages.bible_index)
        .register(&pages.register)
        .audit(&pages.audit);
    for (level, graph) in &pages.sankey {
        bundler = bundler.sankey(*level, graph);
    }
    let manifest = bundler.build()?;

    write_json_pretty(&out_dir.join(&paths.manifest), &manifest)?;
    info!(
        atlas_id = %manifest.atlas_id,
        out_dir = %out_dir.display(),
        artifacts = manifest.artifact_hashes.len(),
        "atlas exported"
    );
    Ok(manifest)
}

/// Load every page from `source` and write it under `out_dir`.
pub fn export_atlas<S: CorpusSource>(
    source: &S,
    normalizer: &OsisNormalizer,
    out_dir: &Path,
    paths: &ExportPaths,
) -> Result<AtlasManifest, ExportError> {
    let pages = AtlasPages::load(source, normalizer)?;
    write_pages(&pages, normalizer, out_dir, paths)
}
