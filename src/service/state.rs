//! Service state management.
//!
//! Contains the corpus source, the normalizer and a cache of built pages.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::atlas::{
    load_audit, load_bible_index, load_register, load_sankey, AuditReport, BibleIndexPage,
    LoadError, RegisterPage, SankeyGraph, SankeyLevel,
};
use crate::normalizer::OsisNormalizer;
use crate::store::CorpusSource;
use super::middleware::record_page_build;

/// Pages built since the last reload.
#[derive(Debug, Default)]
pub struct PageCache {
    bible_index: Option<Arc<BibleIndexPage>>,
    register: Option<Arc<RegisterPage>>,
    sankey: BTreeMap<SankeyLevel, Arc<SankeyGraph>>,
    audit: Option<Arc<AuditReport>>,
    generation: u64,
}

impl PageCache {
    /// Number of cached pages.
    pub fn len(&self) -> usize {
        usize::from(self.bible_index.is_some())
            + usize::from(self.register.is_some())
            + usize::from(self.audit.is_some())
            + self.sankey.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reload counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn clear(&mut self) -> usize {
        let cleared = self.len();
        self.bible_index = None;
        self.register = None;
        self.sankey.clear();
        self.audit = None;
        self.generation += 1;
        cleared
    }
}

/// Shared service state.
///
/// Pages are built on first request and served from the cache until
/// [`ServiceState::reload`]. The cache lock is never held while a page builds.
pub struct ServiceState<S: CorpusSource + 'static> {
    /// The corpus source pages are built from.
    pub store: Arc<S>,
    /// Normalizer over the configured canon.
    pub normalizer: OsisNormalizer,
    cache: Arc<RwLock<PageCache>>,
}

impl<S: CorpusSource + 'static> ServiceState<S> {
    /// Create new service state with a corpus source and normalizer.
    pub fn new(store: S, normalizer: OsisNormalizer) -> Self {
        Self {
            store: Arc::new(store),
            normalizer,
            cache: Arc::new(RwLock::new(PageCache::default())),
        }
    }

    fn cached<T>(
        &self,
        page: &'static str,
        get: impl Fn(&PageCache) -> Option<Arc<T>>,
        build: impl FnOnce() -> Result<T, LoadError>,
        put: impl FnOnce(&mut PageCache, Arc<T>),
    ) -> Result<Arc<T>, LoadError> {
        let generation = {
            let cache = self.cache.read();
            if let Some(hit) = get(&*cache) {
                return Ok(hit);
            }
            cache.generation
        };

        let start = Instant::now();
        let built = Arc::new(build()?);
        record_page_build(page, start.elapsed().as_millis() as u64);

        let mut cache = self.cache.write();
        // A reload during the build leaves the stale page out of the cache.
        if cache.generation == generation {
            if let Some(existing) = get(&*cache) {
                return Ok(existing);
            }
            put(&mut *cache, Arc::clone(&built));
        }
        Ok(built)
    }

    /// The bibelstellen page.
    pub fn bible_index(&self) -> Result<Arc<BibleIndexPage>, LoadError> {
        self.cached(
            "bibelstellen",
            |c| c.bible_index.clone(),
            || load_bible_index(self.store.as_ref(), &self.normalizer),
            |c, page| c.bible_index = Some(page),
        )
    }

    /// The register page.
    pub fn register(&self) -> Result<Arc<RegisterPage>, LoadError> {
        self.cached(
            "register",
            |c| c.register.clone(),
            || load_register(self.store.as_ref()),
            |c, page| c.register = Some(page),
        )
    }

    /// The sankey graph for a level.
    pub fn sankey(&self, level: SankeyLevel) -> Result<Arc<SankeyGraph>, LoadError> {
        self.cached(
            "sankey",
            |c| c.sankey.get(&level).cloned(),
            || load_sankey(self.store.as_ref(), level, &self.normalizer),
            |c, page| {
                c.sankey.insert(level, page);
            },
        )
    }

    /// The reference audit.
    pub fn audit(&self) -> Result<Arc<AuditReport>, LoadError> {
        self.cached(
            "audit",
            |c| c.audit.clone(),
            || load_audit(self.store.as_ref(), &self.normalizer),
            |c, page| c.audit = Some(page),
        )
    }

    /// Drop every cached page. Returns the number of pages dropped and the new generation.
    pub fn reload(&self) -> (usize, u64) {
        let mut cache = self.cache.write();
        let cleared = cache.clear();
        (cleared, cache.generation)
    }

    /// Number of cached pages and the current generation.
    pub fn cache_stats(&self) -> (usize, u64) {
        let cache = self.cache.read();
        (cache.len(), cache.generation)
    }
}

impl<S: CorpusSource + 'static> Clone for ServiceState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            normalizer: self.normalizer.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCorpusSource;
    use crate::types::{BibleRefRecord, RefOccurrence};

    fn state() -> ServiceState<InMemoryCorpusSource> {
        let mut source = InMemoryCorpusSource::new();
        source.add_bible_refs(BibleRefRecord::new("D1", vec![RefOccurrence::new("Gen", "Gen.1.1")]));
        ServiceState::new(source, OsisNormalizer::default())
    }

    #[test]
    fn test_pages_are_cached() {
        let state = state();
        let first = state.bible_index().unwrap();
        let second = state.bible_index().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(state.cache_stats(), (1, 0));
    }

    #[test]
    fn test_reload_clears_cache() {
        let state = state();
        state.bible_index().unwrap();
        state.audit().unwrap();

        assert_eq!(state.reload(), (2, 1));
        assert_eq!(state.cache_stats(), (0, 1));
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let state = state();
        assert!(state.sankey(SankeyLevel::Verse).is_err());
        assert_eq!(state.cache_stats().0, 0);
    }
}
