//! Document metadata and document ordering.

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Metadata for one corpus document (`aco-metadata.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    /// URL slug, also the document id used by reference records.
    pub slug: String,
    /// Edition document number (usually numeric, e.g. `"12"`).
    #[serde(default, deserialize_with = "string_or_number")]
    pub aco_doc_num: Option<String>,
    /// Preformatted label (e.g. `"Dok. 12"`).
    #[serde(default)]
    pub aco_doc_label: Option<String>,
    /// Document title.
    #[serde(default)]
    pub title: Option<String>,
}

impl DocumentMeta {
    /// Create metadata with only a slug.
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            aco_doc_num: None,
            aco_doc_label: None,
            title: None,
        }
    }

    /// Set the document number.
    pub fn with_doc_num(mut self, num: impl Into<String>) -> Self {
        self.aco_doc_num = Some(num.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Label for lists: explicit label, else `Dok. <num>`, else the slug.
    pub fn display_label(&self) -> String {
        if let Some(label) = self.aco_doc_label.as_deref().filter(|l| !l.is_empty()) {
            return label.to_string();
        }
        match self.aco_doc_num.as_deref().filter(|n| !n.is_empty()) {
            Some(num) => format!("Dok. {}", num),
            None => self.slug.clone(),
        }
    }

    /// Title, falling back to the slug.
    pub fn display_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.slug.clone())
    }
}

/// `{ "metaData": [...] }` wrapper of the metadata file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataFile {
    /// All documents.
    #[serde(default)]
    pub meta_data: Vec<DocumentMeta>,
}

/// Anything that sorts like a document in the web views.
pub trait DocumentSortKey {
    /// Raw document number.
    fn doc_num(&self) -> Option<&str>;
    /// Slug used as the final tie-breaker.
    fn slug(&self) -> &str;
}

impl DocumentSortKey for DocumentMeta {
    fn doc_num(&self) -> Option<&str> {
        self.aco_doc_num.as_deref()
    }

    fn slug(&self) -> &str {
        &self.slug
    }
}

/// Parse a document number; empty or non-numeric values give `None`.
pub fn parse_doc_num(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Document order: numbered documents ascending, then unnumbered ones, then by slug.
pub fn compare_docs<A: DocumentSortKey, B: DocumentSortKey>(a: &A, b: &B) -> Ordering {
    match (parse_doc_num(a.doc_num()), parse_doc_num(b.doc_num())) {
        (Some(na), Some(nb)) => na
            .partial_cmp(&nb)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.slug().cmp(b.slug())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.slug().cmp(b.slug()),
    }
}

/// Slug → metadata lookup.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    docs: BTreeMap<String, DocumentMeta>,
}

impl DocumentIndex {
    /// Build an index; later duplicates replace earlier ones.
    pub fn new(docs: impl IntoIterator<Item = DocumentMeta>) -> Self {
        Self {
            docs: docs.into_iter().map(|d| (d.slug.clone(), d)).collect(),
        }
    }

    /// Look up a document by slug.
    pub fn get(&self, slug: &str) -> Option<&DocumentMeta> {
        self.docs.get(slug)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label_fallbacks() {
        let mut doc = DocumentMeta::new("brief-an-x");
        assert_eq!(doc.display_label(), "brief-an-x");

        doc.aco_doc_num = Some("7".to_string());
        assert_eq!(doc.display_label(), "Dok. 7");

        doc.aco_doc_label = Some("Dok. 7a".to_string());
        assert_eq!(doc.display_label(), "Dok. 7a");
    }

    #[test]
    fn test_compare_docs_numbered_first() {
        let mut docs = vec![
            DocumentMeta::new("zeta"),
            DocumentMeta::new("b").with_doc_num("10"),
            DocumentMeta::new("alpha"),
            DocumentMeta::new("a").with_doc_num("2"),
        ];
        docs.sort_by(compare_docs);

        let slugs: Vec<_> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, ["a", "b", "alpha", "zeta"]);
    }

    #[test]
    fn test_doc_num_accepts_json_number() {
        let doc: DocumentMeta =
            serde_json::from_str(r#"{"slug":"x","acoDocNum":12}"#).unwrap();
        assert_eq!(doc.aco_doc_num.as_deref(), Some("12"));

        let doc: DocumentMeta = serde_json::from_str(r#"{"slug":"x","acoDocNum":null}"#).unwrap();
        assert_eq!(doc.aco_doc_num, None);
    }

    #[test]
    fn test_parse_doc_num() {
        assert_eq!(parse_doc_num(Some(" 12 ")), Some(12.0));
        assert_eq!(parse_doc_num(Some("")), None);
        assert_eq!(parse_doc_num(Some("12a")), None);
        assert_eq!(parse_doc_num(None), None);
    }
}
