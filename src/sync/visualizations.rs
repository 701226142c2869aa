//! Visualization assets and the pipeline outputs they load.
//!
//! ```text
//! data_processing/visualization/*.{html,css,js}  →  static/visualization/
//! data_processing/output/networks/*.json         →  static/visualization/output/networks/
//! data_processing/output/geo/places.geojson      →  static/visualization/output/geo/
//! data_processing/output/{register.json,corpus.jsonl} → static/visualization/output/
//! ```

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ProjectLayout;
use super::{copy_file, SyncError, SyncReport};

/// Extensions of web assets copied from the visualization source.
pub const WEB_EXTENSIONS: [&str; 3] = ["html", "css", "js"];

/// Pipeline outputs copied verbatim, relative to the output directory.
const OUTPUT_FILES: [&str; 3] = ["geo/places.geojson", "register.json", "corpus.jsonl"];

/// Regular files directly in `dir` whose extension is in `extensions`, sorted by name.
fn files_with_extension(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, SyncError> {
    let entries = std::fs::read_dir(dir).map_err(|source| SyncError::input(dir, source))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SyncError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type().map_err(|source| SyncError::Io {
            path: entry.path(),
            source,
        })?;
        if !file_type.is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Copy the visualization bundle into the static directory.
pub fn sync_visualizations(layout: &ProjectLayout) -> Result<SyncReport, SyncError> {
    let paths = layout.paths();
    let vis_source = layout.resolve(&paths.visualization_source);
    let vis_target = layout.resolve(&paths.visualization_target);
    let output_source = layout.resolve(&paths.pipeline_output);
    let output_target = vis_target.join("output");
    let networks_source = layout.resolve(&paths.networks_dir);
    let networks_target = output_target.join("networks");

    let mut report = SyncReport::new();

    for src in files_with_extension(&vis_source, &WEB_EXTENSIONS)? {
        if let Some(name) = src.file_name() {
            report.push(copy_file(layout, &src, &vis_target.join(name))?);
        }
    }

    std::fs::create_dir_all(&networks_target).map_err(|source| SyncError::Io {
        path: networks_target.clone(),
        source,
    })?;
    for src in files_with_extension(&networks_source, &["json"])? {
        if let Some(name) = src.file_name() {
            report.push(copy_file(layout, &src, &networks_target.join(name))?);
        }
    }

    for rel in OUTPUT_FILES {
        report.push(copy_file(
            layout,
            &output_source.join(rel),
            &output_target.join(rel),
        )?);
    }

    info!(
        files = report.entries.len(),
        target = %layout.display_path(&vis_target),
        "synced visualizations"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "vis/b.js", "");
        write(dir.path(), "vis/a.html", "");
        write(dir.path(), "vis/notes.md", "");
        write(dir.path(), "vis/sub/c.css", "");

        let files = files_with_extension(&dir.path().join("vis"), &WEB_EXTENSIONS).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.html", "b.js"]);
    }

    #[test]
    fn test_missing_output_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "data_processing/visualization/index.html", "<html>");
        write(dir.path(), "data_processing/output/networks/bible_document.json", "{}");

        let err = sync_visualizations(&ProjectLayout::new(dir.path())).unwrap_err();
        match err {
            SyncError::MissingInput { path } => assert!(path.ends_with("geo/places.geojson")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
