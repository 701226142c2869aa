//! Bibelstellen index: every cited reference grouped by book, with the
//! documents that cite it.
//!
//! ```text
//! records ──► ReferenceAggregate::build ──► into_page(docs) ──► BibleIndexPage
//!               (book, osis) → count,                            OT / NT lists,
//!               doc → count                                      canonical order
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::normalizer::OsisNormalizer;
use crate::types::{
    compare_docs, BibleRefRecord, DocumentIndex, DocumentSortKey, OsisReference, Testament,
};

/// A document citing a reference, with its citation count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCitation {
    /// Document slug (or the raw id when the document is unknown).
    pub slug: String,
    /// Document label.
    pub label: String,
    /// Document title.
    pub title: String,
    /// Document number.
    pub aco_doc_num: Option<String>,
    /// Occurrences of the reference in this document.
    pub count: u64,
}

impl DocumentSortKey for DocumentCitation {
    fn doc_num(&self) -> Option<&str> {
        self.aco_doc_num.as_deref()
    }

    fn slug(&self) -> &str {
        &self.slug
    }
}

/// One distinct reference of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntry {
    /// OSIS text.
    pub osis: String,
    /// Display form.
    pub label: String,
    /// Book abbreviation.
    pub book: String,
    /// Book display label.
    pub book_label: String,
    /// Chapter.
    pub chapter: u32,
    /// Verse.
    pub verse: u32,
    /// Range end.
    pub verse_end: u32,
    /// Total occurrences across the corpus.
    pub count: u64,
    /// Citing documents in document order.
    pub docs: Vec<DocumentCitation>,
}

/// All references of one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookEntry {
    /// Book abbreviation.
    pub book: String,
    /// Book display label.
    pub label: String,
    /// Testament.
    pub testament: Testament,
    /// Sum of all reference counts.
    pub count: u64,
    /// References in canonical order.
    pub refs: Vec<ReferenceEntry>,
}

/// The bibelstellen page data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleIndexPage {
    /// Old Testament books (deuterocanonical and unknown books included).
    pub old_testament: Vec<BookEntry>,
    /// New Testament books.
    pub new_testament: Vec<BookEntry>,
}

impl BibleIndexPage {
    /// All books, OT first.
    pub fn books(&self) -> impl Iterator<Item = &BookEntry> {
        self.old_testament.iter().chain(self.new_testament.iter())
    }

    /// Number of distinct references.
    pub fn reference_count(&self) -> usize {
        self.books().map(|b| b.refs.len()).sum()
    }
}

#[derive(Debug, Clone, Default)]
struct RefBucket {
    count: u64,
    verse_end_hint: Option<u32>,
    docs: BTreeMap<String, u64>,
}

/// Reference occurrences grouped by `(book, osis)`.
///
/// Built in one pass over the records and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReferenceAggregate {
    books: BTreeMap<String, BTreeMap<String, RefBucket>>,
    skipped_records: usize,
    skipped_refs: usize,
}

impl ReferenceAggregate {
    /// Group the occurrences of all records.
    ///
    /// Records without a document id or references, and occurrences without
    /// a book or OSIS text, are skipped.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a BibleRefRecord>,
    {
        let mut aggregate = Self::default();

        for record in records {
            if record.doc_id.is_empty() || record.refs.is_empty() {
                aggregate.skipped_records += 1;
                continue;
            }
            for occurrence in &record.refs {
                if occurrence.book.is_empty() || occurrence.osis.is_empty() {
                    aggregate.skipped_refs += 1;
                    continue;
                }
                let bucket = aggregate
                    .books
                    .entry(occurrence.book.clone())
                    .or_default()
                    .entry(occurrence.osis.clone())
                    .or_default();
                bucket.count += 1;
                if bucket.verse_end_hint.is_none() {
                    bucket.verse_end_hint = occurrence.verse_end;
                }
                *bucket.docs.entry(record.doc_id.clone()).or_insert(0) += 1;
            }
        }

        debug!(
            books = aggregate.books.len(),
            skipped_records = aggregate.skipped_records,
            skipped_refs = aggregate.skipped_refs,
            "reference aggregate built"
        );

        aggregate
    }

    /// Number of distinct books.
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Number of distinct `(book, osis)` pairs.
    pub fn reference_count(&self) -> usize {
        self.books.values().map(BTreeMap::len).sum()
    }

    /// Total occurrences.
    pub fn occurrence_count(&self) -> u64 {
        self.books
            .values()
            .flat_map(BTreeMap::values)
            .map(|b| b.count)
            .sum()
    }

    /// Records skipped for lacking a document id or references.
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    /// Occurrences skipped for lacking a book or OSIS text.
    pub fn skipped_refs(&self) -> usize {
        self.skipped_refs
    }

    /// Occurrence count of one reference.
    pub fn count(&self, book: &str, osis: &str) -> Option<u64> {
        self.books.get(book)?.get(osis).map(|b| b.count)
    }

    /// Book entries in canonical order (unknown books last, then by label).
    pub fn book_entries(&self, docs: &DocumentIndex, normalizer: &OsisNormalizer) -> Vec<BookEntry> {
        let mut entries: Vec<BookEntry> = self
            .books
            .iter()
            .map(|(book, refs)| {
                let mut references: Vec<ReferenceEntry> = refs
                    .iter()
                    .map(|(osis, bucket)| reference_entry(book, osis, bucket, docs, normalizer))
                    .collect();
                references.sort_by(|a, b| normalizer.compare(&a.osis, &b.osis));

                BookEntry {
                    book: book.clone(),
                    label: normalizer.label(book).to_string(),
                    testament: normalizer.testament(book),
                    count: references.iter().map(|r| r.count).sum(),
                    refs: references,
                }
            })
            .collect();

        entries.sort_by(|a, b| normalizer.compare_books(&a.book, &b.book));
        entries
    }

    /// Page data split by testament.
    pub fn into_page(self, docs: &DocumentIndex, normalizer: &OsisNormalizer) -> BibleIndexPage {
        let (new_testament, old_testament): (Vec<BookEntry>, Vec<BookEntry>) = self
            .book_entries(docs, normalizer)
            .into_iter()
            .partition(|b| b.testament == Testament::New);

        BibleIndexPage {
            old_testament,
            new_testament,
        }
    }
}

fn reference_entry(
    book: &str,
    osis: &str,
    bucket: &RefBucket,
    docs: &DocumentIndex,
    normalizer: &OsisNormalizer,
) -> ReferenceEntry {
    let parsed = OsisReference::parse(osis);
    let verse_end = match parsed.verse_end {
        0 => bucket.verse_end_hint.unwrap_or(0),
        end => end,
    };

    let mut citations: Vec<DocumentCitation> = bucket
        .docs
        .iter()
        .map(|(doc_id, count)| match docs.get(doc_id) {
            Some(meta) => DocumentCitation {
                slug: meta.slug.clone(),
                label: meta.display_label(),
                title: meta.display_title(),
                aco_doc_num: meta.aco_doc_num.clone(),
                count: *count,
            },
            None => DocumentCitation {
                slug: doc_id.clone(),
                label: doc_id.clone(),
                title: doc_id.clone(),
                aco_doc_num: None,
                count: *count,
            },
        })
        .collect();
    citations.sort_by(compare_docs);

    ReferenceEntry {
        osis: osis.to_string(),
        label: normalizer.format_display(osis),
        book: book.to_string(),
        book_label: normalizer.label(book).to_string(),
        chapter: parsed.chapter,
        verse: parsed.verse,
        verse_end,
        count: bucket.count,
        docs: citations,
    }
}

/// Build the bibelstellen page in one call.
pub fn build_bible_index(
    records: &[BibleRefRecord],
    docs: &DocumentIndex,
    normalizer: &OsisNormalizer,
) -> BibleIndexPage {
    ReferenceAggregate::build(records).into_page(docs, normalizer)
}
