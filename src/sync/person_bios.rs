//! Person biographies: validated and re-written as pretty JSON.

use serde_json::Value;
use tracing::info;

use crate::config::ProjectLayout;
use crate::store::read_json;
use super::{write_file, SyncError, SyncReport};

/// Re-write the pipeline's biography file into the web app data directory.
pub fn sync_person_bios(layout: &ProjectLayout) -> Result<SyncReport, SyncError> {
    let src = layout.resolve(&layout.paths().person_bios_source);
    let data: Value = read_json(&src).map_err(|e| SyncError::parse(&src, e))?;

    let dest = layout.resolve(&layout.paths().person_bios);
    let entry = write_file(layout, &dest, &serde_json::to_vec_pretty(&data)?)?;
    let bios = data.get("bios").and_then(Value::as_array).map_or(0, Vec::len);
    info!(
        bios,
        target = %entry.path,
        status = %entry.status,
        "synced person bios"
    );

    let mut report = SyncReport::new();
    report.push(entry);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncStatus;
    use std::fs;

    #[test]
    fn test_rewrites_pretty() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("data_processing/output/person_bios_a.json");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, r#"{"bios":[{"label":"Paulus","bio":"Apostel"}]}"#).unwrap();
        let layout = ProjectLayout::new(dir.path());

        let report = sync_person_bios(&layout).unwrap();
        assert_eq!(report.entries[0].path, "src/lib/data/aco-person-bios-a.json");
        assert_eq!(report.entries[0].status, SyncStatus::Written);

        let written = fs::read_to_string(dir.path().join("src/lib/data/aco-person-bios-a.json")).unwrap();
        assert!(written.starts_with("{\n  \"bios\""));

        let again = sync_person_bios(&layout).unwrap();
        assert_eq!(again.entries[0].status, SyncStatus::Unchanged);
    }

    #[test]
    fn test_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("data_processing/output/person_bios_a.json");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, "not json").unwrap();

        let err = sync_person_bios(&ProjectLayout::new(dir.path())).unwrap_err();
        assert!(matches!(err, SyncError::Source(_)));
    }
}
