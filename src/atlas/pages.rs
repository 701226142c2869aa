//! Page loaders: read a corpus source and build one page each.

use std::collections::BTreeMap;
use tracing::debug;

use crate::normalizer::OsisNormalizer;
use crate::store::CorpusSource;
use crate::types::DocumentIndex;
use super::{
    audit_references, build_bible_index, build_sankey, AuditReport, BibleIndexPage,
    RegisterPage, SankeyGraph, SankeyLevel,
};

/// Boxed corpus source error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to load a page.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The corpus source failed.
    #[error("failed to load {what}: {source}")]
    Source {
        /// What was being read.
        what: &'static str,
        /// Underlying source error.
        #[source]
        source: BoxError,
    },
}

fn read<T, E>(what: &'static str, result: Result<T, E>) -> Result<T, LoadError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.map_err(|e| LoadError::Source {
        what,
        source: Box::new(e),
    })
}

/// Build the bibelstellen page.
pub fn load_bible_index<S: CorpusSource>(
    source: &S,
    normalizer: &OsisNormalizer,
) -> Result<BibleIndexPage, LoadError> {
    let records = read("bible references", source.bible_refs())?;
    let docs = DocumentIndex::new(read("document metadata", source.documents())?);
    debug!(records = records.len(), documents = docs.len(), "building bibelstellen page");
    Ok(build_bible_index(&records, &docs, normalizer))
}

/// Build the register page.
pub fn load_register<S: CorpusSource>(source: &S) -> Result<RegisterPage, LoadError> {
    let register = read("register", source.register())?;
    let bios = read("person biographies", source.person_bios())?;
    Ok(RegisterPage::build(&register, &bios))
}

/// Build the sankey graph for a level.
pub fn load_sankey<S: CorpusSource>(
    source: &S,
    level: SankeyLevel,
    normalizer: &OsisNormalizer,
) -> Result<SankeyGraph, LoadError> {
    let graph = read("network", source.network(level.source_file()))?;
    debug!(
        %level,
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        "building sankey graph"
    );
    Ok(build_sankey(&graph, level, normalizer))
}

/// Audit the stored references.
pub fn load_audit<S: CorpusSource>(
    source: &S,
    normalizer: &OsisNormalizer,
) -> Result<AuditReport, LoadError> {
    let records = read("bible references", source.bible_refs())?;
    Ok(audit_references(&records, normalizer))
}

/// Every page of one export.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasPages {
    /// Bibelstellen page.
    pub bible_index: BibleIndexPage,
    /// Register page.
    pub register: RegisterPage,
    /// Sankey graph per level.
    pub sankey: BTreeMap<SankeyLevel, SankeyGraph>,
    /// Audit report.
    pub audit: AuditReport,
}

impl AtlasPages {
    /// Load all pages.
    pub fn load<S: CorpusSource>(source: &S, normalizer: &OsisNormalizer) -> Result<Self, LoadError> {
        let sankey = SankeyLevel::ALL
            .iter()
            .map(|&level| Ok((level, load_sankey(source, level, normalizer)?)))
            .collect::<Result<BTreeMap<_, _>, LoadError>>()?;

        Ok(Self {
            bible_index: load_bible_index(source, normalizer)?,
            register: load_register(source)?,
            sankey,
            audit: load_audit(source, normalizer)?,
        })
    }
}
