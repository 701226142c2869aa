//! Golden tests for the atlas.
//!
//! These tests verify canonical ordering and the page builders end to end.

use std::cmp::Ordering;

use aco_atlas::atlas::{build_sankey, load_bible_index, AtlasPages, SankeyLevel};
use aco_atlas::store::InMemoryCorpusSource;
use aco_atlas::{
    canonical_hash_hex, BibleRefRecord, BookCanon, DocumentMeta, NetworkGraph, NetworkLink,
    NetworkNode, NodeKind, OsisNormalizer, RefOccurrence, Testament,
};
use proptest::prelude::*;

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn occurrence(osis: &str) -> RefOccurrence {
    let book = osis.split('.').next().unwrap_or_default();
    RefOccurrence::new(book, osis)
}

fn corpus() -> InMemoryCorpusSource {
    let mut source = InMemoryCorpusSource::new();
    source.add_bible_refs(BibleRefRecord::new(
        "brief-an-x",
        vec![occurrence("Rom.8.28"), occurrence("Gen.1.1"), occurrence("Ps.23")],
    ));
    source.add_bible_refs(BibleRefRecord::new(
        "predigt-1934",
        vec![occurrence("Gen.1.1"), occurrence("Gen.1.1"), occurrence("Sir.3.1-4")],
    ));
    source.add_document(DocumentMeta::new("brief-an-x").with_doc_num("12").with_title("Brief an X"));
    source.add_document(DocumentMeta::new("predigt-1934").with_doc_num("3").with_title("Predigt"));

    source.add_network(
        "bible_document.json",
        NetworkGraph {
            nodes: vec![
                NetworkNode::new("b:rom-8-28", "Rom.8.28", NodeKind::Bible),
                NetworkNode::new("b:gen-1-1", "Gen.1.1", NodeKind::Bible),
                NetworkNode::new("b:gen-1-5", "Gen.1.5", NodeKind::Bible),
                NetworkNode::new("d:brief-an-x", "Brief an X", NodeKind::Document),
                NetworkNode::new("d:predigt-1934", "Predigt", NodeKind::Document),
            ],
            links: vec![
                NetworkLink::new("b:rom-8-28", "d:brief-an-x", 1.0),
                NetworkLink::new("b:gen-1-1", "d:brief-an-x", 1.0),
                NetworkLink::new("b:gen-1-1", "d:predigt-1934", 2.0),
                NetworkLink::new("b:gen-1-5", "d:predigt-1934", 1.0),
            ],
        },
    );
    source.add_network(
        "bible_book_document.json",
        NetworkGraph {
            nodes: vec![
                NetworkNode::new("b:gen", "Gen", NodeKind::Bible),
                NetworkNode::new("d:predigt-1934", "Predigt", NodeKind::Document),
            ],
            links: vec![NetworkLink::new("b:gen", "d:predigt-1934", 4.0)],
        },
    );
    source
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalizer Contract
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_parse_contract() {
    let normalizer = OsisNormalizer::default();

    let r = normalizer.parse("Gen.3.16");
    assert_eq!((r.book.as_str(), r.chapter, r.verse, r.verse_end), ("Gen", 3, 16, 0));

    let r = normalizer.parse("Gen.3.16-18");
    assert_eq!((r.verse, r.verse_end), (16, 18));

    let r = normalizer.parse("Gen");
    assert_eq!((r.chapter, r.verse), (0, 0));

    let r = normalizer.parse("");
    assert_eq!((r.book.as_str(), r.chapter, r.verse, r.verse_end), ("", 0, 0, 0));

    assert_eq!(normalizer.parse("Xyz.1.1").book, "Xyz");
}

#[test]
fn test_label_contract() {
    let normalizer = OsisNormalizer::default();
    assert_eq!(normalizer.label("Gen"), "Genesis");
    assert_eq!(normalizer.label("Unknown"), "Unknown");

    let display = normalizer.format_display("1Cor.2.3");
    assert!(display.contains("1 Korinther"));
    assert!(display.contains('2'));
    assert!(display.contains('3'));
}

#[test]
fn test_sort_mixed_references() {
    let normalizer = OsisNormalizer::default();
    let mut refs = vec![
        "Rev.22.21", "Xyz.1.1", "Gen.10.1", "Sir.3.1", "Gen.2.4-7", "Matt.1.1", "Gen.2.4", "Ps",
    ];
    refs.sort_by(|a, b| normalizer.compare(a, b));

    assert_eq!(
        refs,
        ["Gen.2.4", "Gen.2.4-7", "Gen.10.1", "Ps", "Sir.3.1", "Matt.1.1", "Rev.22.21", "Xyz.1.1"]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Page Builders
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_aggregation_scenario() {
    let mut source = InMemoryCorpusSource::new();
    source.add_bible_refs(BibleRefRecord::new("D1", vec![occurrence("Gen.1.1")]));
    source.add_bible_refs(BibleRefRecord::new("D2", vec![occurrence("Gen.1.1")]));

    let page = load_bible_index(&source, &OsisNormalizer::default()).unwrap();

    assert_eq!(page.old_testament.len(), 1);
    assert!(page.new_testament.is_empty());
    let book = &page.old_testament[0];
    assert_eq!(book.book, "Gen");
    assert_eq!(book.refs.len(), 1);
    assert_eq!(book.refs[0].count, 2);
    assert_eq!(book.refs[0].docs.len(), 2);
    assert!(book.refs[0].docs.iter().all(|d| d.count == 1));
}

#[test]
fn test_bibelstellen_page() {
    let page = load_bible_index(&corpus(), &OsisNormalizer::default()).unwrap();

    let ot: Vec<_> = page.old_testament.iter().map(|b| b.book.as_str()).collect();
    assert_eq!(ot, ["Gen", "Ps", "Sir"]);
    assert_eq!(page.new_testament[0].book, "Rom");
    assert_eq!(page.new_testament[0].testament, Testament::New);

    let gen = &page.old_testament[0].refs[0];
    assert_eq!(gen.label, "Genesis 1,1");
    assert_eq!(gen.count, 3);
    // Document number 3 sorts before 12.
    let slugs: Vec<_> = gen.docs.iter().map(|d| d.slug.as_str()).collect();
    assert_eq!(slugs, ["predigt-1934", "brief-an-x"]);
    assert_eq!(gen.docs[0].count, 2);

    let sir = &page.old_testament[2].refs[0];
    assert_eq!(sir.label, "Sirach 3,1\u{2013}4");
    assert_eq!(sir.verse_end, 4);
}

#[test]
fn test_sankey_levels() {
    let source = corpus();
    let pages = AtlasPages::load(&source, &OsisNormalizer::default()).unwrap();

    let verse = &pages.sankey[&SankeyLevel::Verse];
    assert_eq!(verse.nodes.len(), 5);
    assert_eq!(verse.links.len(), 4);

    let chapter = &pages.sankey[&SankeyLevel::Chapter];
    let ids: Vec<_> = chapter.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["b:Rom.8", "b:Gen.1", "d:brief-an-x", "d:predigt-1934"]);
    // Gen.1.1 and Gen.1.5 both flow into the sermon.
    let merged = chapter
        .links
        .iter()
        .find(|l| l.source == 1 && l.target == 3)
        .unwrap();
    assert_eq!(merged.value, 3.0);
    assert_eq!(chapter.total_flow(), verse.total_flow());

    let book = &pages.sankey[&SankeyLevel::Book];
    assert_eq!(book.links[0].value, 4.0);
}

#[test]
fn test_pages_are_deterministic() {
    let normalizer = OsisNormalizer::default();
    let first = AtlasPages::load(&corpus(), &normalizer).unwrap();
    let second = AtlasPages::load(&corpus(), &normalizer).unwrap();

    assert_eq!(canonical_hash_hex(&first.bible_index), canonical_hash_hex(&second.bible_index));
    for level in SankeyLevel::ALL {
        assert_eq!(
            canonical_hash_hex(&first.sankey[&level]),
            canonical_hash_hex(&second.sankey[&level])
        );
    }
}

#[test]
fn test_chapter_level_ignores_person_nodes() {
    let graph = NetworkGraph {
        nodes: vec![
            NetworkNode::new("b:gen-1-1", "Gen.1.1", NodeKind::Bible),
            NetworkNode::new("p:paulus", "Paulus", NodeKind::Person),
        ],
        links: vec![NetworkLink::new("b:gen-1-1", "p:paulus", 1.0)],
    };
    let sankey = build_sankey(&graph, SankeyLevel::Chapter, &OsisNormalizer::default());
    assert_eq!(sankey.nodes.len(), 1);
    assert!(sankey.links.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Ordering Invariants
// ─────────────────────────────────────────────────────────────────────────────

fn book_index() -> impl Strategy<Value = usize> {
    0..BookCanon::german().len()
}

fn position() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=999, 1u32..=999)
}

proptest! {
    #[test]
    fn earlier_book_sorts_first(
        a in book_index(),
        b in book_index(),
        (c1, v1) in position(),
        (c2, v2) in position(),
    ) {
        prop_assume!(a < b);
        let normalizer = OsisNormalizer::default();
        let books: Vec<String> = normalizer.canon().books().map(str::to_string).collect();

        let first = format!("{}.{}.{}", books[a], c1, v1);
        let second = format!("{}.{}.{}", books[b], c2, v2);
        prop_assert!(normalizer.order_key(&first) < normalizer.order_key(&second));
    }

    #[test]
    fn chapter_then_verse_within_book(
        book in book_index(),
        (c1, v1) in position(),
        (c2, v2) in position(),
    ) {
        let normalizer = OsisNormalizer::default();
        let name = normalizer.canon().books().nth(book).unwrap().to_string();

        let a = format!("{}.{}.{}", name, c1, v1);
        let b = format!("{}.{}.{}", name, c2, v2);
        prop_assert_eq!(
            normalizer.order_key(&a).cmp(&normalizer.order_key(&b)),
            (c1, v1).cmp(&(c2, v2))
        );
    }

    #[test]
    fn compare_is_antisymmetric(a in "[A-Za-z0-9]{0,6}(\\.[0-9]{1,4}){0,2}(-[0-9]{1,3})?",
                                b in "[A-Za-z0-9]{0,6}(\\.[0-9]{1,4}){0,2}(-[0-9]{1,3})?") {
        let normalizer = OsisNormalizer::default();
        let forward = normalizer.compare(&a, &b);
        prop_assert_eq!(forward, normalizer.compare(&b, &a).reverse());
        if forward == Ordering::Equal {
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn parse_never_panics(text in "\\PC*") {
        let normalizer = OsisNormalizer::default();
        let key = normalizer.order_key(&text);
        prop_assert_eq!(key, normalizer.order_key(&text));
        let _ = normalizer.format_display(&text);
    }
}
