//! Data-quality audit of the detected references.
//!
//! The audit never fails: every reference is checked with the strict parser
//! and the canon, and offending ones are listed with their document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::normalizer::{OsisNormalizer, ReferenceIssue};
use crate::types::{BibleRefRecord, OsisReference};

/// One reference with at least one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFinding {
    /// Citing document.
    pub doc_id: String,
    /// Reference text as stored.
    pub osis: String,
    /// Book as declared by the record.
    pub book: String,
    /// Issues found.
    pub issues: Vec<ReferenceIssue>,
}

/// Result of auditing a set of reference records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Records read.
    pub records_scanned: usize,
    /// Reference occurrences checked.
    pub references_scanned: usize,
    /// Total issues across all findings.
    pub issue_count: usize,
    /// Occurrences without issues.
    pub clean_count: usize,
    /// Issue counts by kind.
    pub by_kind: BTreeMap<String, usize>,
    /// Offending occurrences in input order.
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    /// Whether no issue was found.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Issues of a single occurrence, including a declared/parsed book mismatch.
pub fn check_occurrence(
    normalizer: &OsisNormalizer,
    declared_book: &str,
    osis: &str,
) -> Vec<ReferenceIssue> {
    let mut issues = normalizer.validate(osis);
    let parsed = OsisReference::parse(osis).book;
    if !declared_book.is_empty() && !parsed.is_empty() && declared_book != parsed {
        issues.push(ReferenceIssue::BookMismatch {
            declared: declared_book.to_string(),
            parsed,
        });
    }
    issues
}

/// Audit every occurrence of every record.
pub fn audit_references<'a, I>(records: I, normalizer: &OsisNormalizer) -> AuditReport
where
    I: IntoIterator<Item = &'a BibleRefRecord>,
{
    let mut report = AuditReport::default();

    for record in records {
        report.records_scanned += 1;
        for occurrence in &record.refs {
            report.references_scanned += 1;
            let issues = check_occurrence(normalizer, &occurrence.book, &occurrence.osis);
            if issues.is_empty() {
                report.clean_count += 1;
                continue;
            }

            debug!(
                doc_id = %record.doc_id,
                osis = %occurrence.osis,
                issues = issues.len(),
                "reference issue"
            );
            for issue in &issues {
                *report.by_kind.entry(issue.kind().to_string()).or_insert(0) += 1;
            }
            report.issue_count += issues.len();
            report.findings.push(AuditFinding {
                doc_id: record.doc_id.clone(),
                osis: occurrence.osis.clone(),
                book: occurrence.book.clone(),
                issues,
            });
        }
    }

    info!(
        records = report.records_scanned,
        references = report.references_scanned,
        findings = report.findings.len(),
        "reference audit complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RefOccurrence;

    #[test]
    fn test_clean_records() {
        let records = vec![BibleRefRecord::new(
            "D1",
            vec![RefOccurrence::new("Gen", "Gen.1.1"), RefOccurrence::new("Ps", "Ps.23")],
        )];
        let report = audit_references(&records, &OsisNormalizer::default());

        assert!(report.is_clean());
        assert_eq!(report.references_scanned, 2);
        assert_eq!(report.clean_count, 2);
    }

    #[test]
    fn test_findings() {
        let records = vec![
            BibleRefRecord::new(
                "D1",
                vec![
                    RefOccurrence::new("Gen", "Gen.x"),
                    RefOccurrence::new("Xyz", "Xyz.1.1"),
                    RefOccurrence::new("Exod", "Gen.1.1"),
                ],
            ),
            BibleRefRecord::new("D2", vec![RefOccurrence::new("Rom", "Rom.8.28")]),
        ];
        let report = audit_references(&records, &OsisNormalizer::default());

        assert_eq!(report.records_scanned, 2);
        assert_eq!(report.references_scanned, 4);
        assert_eq!(report.clean_count, 1);
        assert_eq!(report.findings.len(), 3);
        assert_eq!(report.by_kind["malformed"], 1);
        assert_eq!(report.by_kind["unknown_book"], 1);
        assert_eq!(report.by_kind["book_mismatch"], 1);
        assert_eq!(report.issue_count, 3);
        assert_eq!(report.findings[2].issues[0], ReferenceIssue::BookMismatch {
            declared: "Exod".to_string(),
            parsed: "Gen".to_string(),
        });
    }

    #[test]
    fn test_issue_serialization() {
        let issues = check_occurrence(&OsisNormalizer::default(), "Xyz", "Xyz.1.1");
        let json = serde_json::to_value(&issues).unwrap();
        assert_eq!(json[0]["kind"], "unknown_book");
        assert_eq!(json[0]["book"], "Xyz");
    }
}
