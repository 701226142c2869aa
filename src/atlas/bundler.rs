//! Atlas bundler for packaging exported pages with a manifest.
//!
//! The manifest records the canon fingerprint and a content hash of every
//! exported page, so two exports over the same corpus can be compared
//! without diffing the files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canon::BookCanon;
use crate::canonical::canonical_hash_hex;
use super::{AuditReport, BibleIndexPage, RegisterPage, SankeyGraph, SankeyLevel, ATLAS_SCHEMA_VERSION};

/// File names of exported artifacts, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPaths {
    /// Bibelstellen page.
    pub bibelstellen: String,
    /// Register page.
    pub register: String,
    /// Verse-level sankey graph.
    pub sankey_verse: String,
    /// Chapter-level sankey graph.
    pub sankey_chapter: String,
    /// Book-level sankey graph.
    pub sankey_book: String,
    /// Audit report.
    pub audit: String,
    /// Manifest.
    pub manifest: String,
}

impl Default for ExportPaths {
    fn default() -> Self {
        Self {
            bibelstellen: "bibelstellen_v1.json".to_string(),
            register: "register_v1.json".to_string(),
            sankey_verse: "sankey_verse_v1.json".to_string(),
            sankey_chapter: "sankey_chapter_v1.json".to_string(),
            sankey_book: "sankey_book_v1.json".to_string(),
            audit: "audit_v1.json".to_string(),
            manifest: "atlas_manifest.json".to_string(),
        }
    }
}

impl ExportPaths {
    /// File name of the sankey graph for a level.
    pub fn sankey(&self, level: SankeyLevel) -> &str {
        match level {
            SankeyLevel::Verse => &self.sankey_verse,
            SankeyLevel::Chapter => &self.sankey_chapter,
            SankeyLevel::Book => &self.sankey_book,
        }
    }
}

/// Summary statistics for an export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasStats {
    /// Books with at least one reference.
    pub book_count: usize,
    /// Distinct references.
    pub reference_count: usize,
    /// Register entries (places and people).
    pub register_entry_count: usize,
    /// Node counts per sankey level.
    pub sankey_node_counts: BTreeMap<String, usize>,
    /// Audit findings.
    pub audit_finding_count: usize,
}

/// The complete Atlas manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasManifest {
    /// Hash over the canon fingerprint and all artifact hashes.
    pub atlas_id: String,
    /// Schema version.
    pub version: String,
    /// Name of the book table.
    pub canon_name: String,
    /// Fingerprint of the book table.
    pub canon_fingerprint: String,
    /// When the export ran.
    pub computed_at: DateTime<Utc>,
    /// Paths to all artifacts.
    pub artifact_paths: ExportPaths,
    /// Content hash per artifact file name.
    pub artifact_hashes: BTreeMap<String, String>,
    /// Summary statistics.
    pub stats: AtlasStats,
}

/// Missing manifest component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleError {
    /// A required component was not set.
    #[error("{0} is required")]
    Missing(&'static str),
}

/// Builder for Atlas manifests.
pub struct AtlasBundler {
    canon: Option<(String, String)>,
    artifact_hashes: BTreeMap<String, String>,
    stats: AtlasStats,
    has_bible_index: bool,
    artifact_paths: ExportPaths,
    computed_at: Option<DateTime<Utc>>,
}

impl AtlasBundler {
    /// Create a new bundler.
    pub fn new() -> Self {
        Self {
            canon: None,
            artifact_hashes: BTreeMap::new(),
            stats: AtlasStats::default(),
            has_bible_index: false,
            artifact_paths: ExportPaths::default(),
            computed_at: None,
        }
    }

    /// Set custom artifact paths.
    ///
    /// Call before adding pages; hashes are keyed by file name.
    pub fn with_paths(mut self, paths: ExportPaths) -> Self {
        self.artifact_paths = paths;
        self
    }

    /// Fix the timestamp instead of using the current time.
    pub fn computed_at(mut self, at: DateTime<Utc>) -> Self {
        self.computed_at = Some(at);
        self
    }

    /// Set the canon the pages were built with.
    pub fn canon(mut self, canon: &BookCanon) -> Self {
        self.canon = Some((canon.name().to_string(), canon.fingerprint().to_string()));
        self
    }

    /// Add the bibelstellen page.
    pub fn bible_index(mut self, page: &BibleIndexPage) -> Self {
        self.stats.book_count = page.books().count();
        self.stats.reference_count = page.reference_count();
        self.has_bible_index = true;
        let name = self.artifact_paths.bibelstellen.clone();
        self.artifact_hashes.insert(name, canonical_hash_hex(page));
        self
    }

    /// Add the register page.
    pub fn register(mut self, page: &RegisterPage) -> Self {
        self.stats.register_entry_count = page.entry_count();
        let name = self.artifact_paths.register.clone();
        self.artifact_hashes.insert(name, canonical_hash_hex(page));
        self
    }

    /// Add a sankey graph.
    pub fn sankey(mut self, level: SankeyLevel, graph: &SankeyGraph) -> Self {
        self.stats
            .sankey_node_counts
            .insert(level.to_string(), graph.nodes.len());
        let name = self.artifact_paths.sankey(level).to_string();
        self.artifact_hashes.insert(name, canonical_hash_hex(graph));
        self
    }

    /// Add the audit report.
    pub fn audit(mut self, report: &AuditReport) -> Self {
        self.stats.audit_finding_count = report.findings.len();
        let name = self.artifact_paths.audit.clone();
        self.artifact_hashes.insert(name, canonical_hash_hex(report));
        self
    }

    /// Build the Atlas manifest.
    ///
    /// The canon and the bibelstellen page are required; every other page
    /// is optional.
    pub fn build(self) -> Result<AtlasManifest, BundleError> {
        let (canon_name, canon_fingerprint) = self.canon.ok_or(BundleError::Missing("canon"))?;
        if !self.has_bible_index {
            return Err(BundleError::Missing("bible_index"));
        }

        let atlas_id = canonical_hash_hex(&AtlasIdInput {
            canon_fingerprint: &canon_fingerprint,
            artifact_hashes: &self.artifact_hashes,
        });

        Ok(AtlasManifest {
            atlas_id,
            version: ATLAS_SCHEMA_VERSION.to_string(),
            canon_name,
            canon_fingerprint,
            computed_at: self.computed_at.unwrap_or_else(Utc::now),
            artifact_paths: self.artifact_paths,
            artifact_hashes: self.artifact_hashes,
            stats: self.stats,
        })
    }

    /// Try to build, returning None if components are missing.
    pub fn try_build(self) -> Option<AtlasManifest> {
        self.build().ok()
    }
}

impl Default for AtlasBundler {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal struct for computing atlas_id.
#[derive(Serialize)]
struct AtlasIdInput<'a> {
    canon_fingerprint: &'a str,
    artifact_hashes: &'a BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::build_bible_index;
    use crate::normalizer::OsisNormalizer;
    use crate::types::{BibleRefRecord, DocumentIndex, RefOccurrence};
    use chrono::TimeZone;

    fn make_test_page() -> BibleIndexPage {
        let records = vec![BibleRefRecord::new(
            "D1",
            vec![RefOccurrence::new("Gen", "Gen.1.1"), RefOccurrence::new("Rom", "Rom.1.1")],
        )];
        build_bible_index(&records, &DocumentIndex::default(), &OsisNormalizer::default())
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_bundler_build() {
        let manifest = AtlasBundler::new()
            .canon(&BookCanon::german())
            .bible_index(&make_test_page())
            .audit(&AuditReport::default())
            .build()
            .unwrap();

        assert!(!manifest.atlas_id.is_empty());
        assert_eq!(manifest.version, ATLAS_SCHEMA_VERSION);
        assert_eq!(manifest.canon_name, "de");
        assert_eq!(manifest.stats.book_count, 2);
        assert_eq!(manifest.stats.reference_count, 2);
        assert_eq!(manifest.artifact_hashes.len(), 2);
        assert!(manifest.artifact_hashes.contains_key("bibelstellen_v1.json"));
    }

    #[test]
    fn test_bundler_missing_components() {
        let result = AtlasBundler::new().bible_index(&make_test_page()).build();
        assert_eq!(result.unwrap_err(), BundleError::Missing("canon"));

        let result = AtlasBundler::new().canon(&BookCanon::german()).try_build();
        assert!(result.is_none());
    }

    #[test]
    fn test_manifest_determinism() {
        let page = make_test_page();
        let build = || {
            AtlasBundler::new()
                .computed_at(fixed_time())
                .canon(&BookCanon::german())
                .bible_index(&page)
                .sankey(SankeyLevel::Chapter, &SankeyGraph::default())
                .build()
                .unwrap()
        };

        let manifest1 = build();
        let manifest2 = build();
        assert_eq!(manifest1, manifest2);
        assert_eq!(manifest1.stats.sankey_node_counts["chapter"], 0);
    }

    #[test]
    fn test_atlas_id_tracks_content() {
        let base = AtlasBundler::new()
            .canon(&BookCanon::german())
            .bible_index(&make_test_page())
            .build()
            .unwrap();
        let changed = AtlasBundler::new()
            .canon(&BookCanon::german())
            .bible_index(&BibleIndexPage::default())
            .build()
            .unwrap();

        assert_ne!(base.atlas_id, changed.atlas_id);
    }
}
