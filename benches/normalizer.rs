//! Performance benchmarks for reference normalization and page building.
//!
//! Run with: `cargo bench --bench normalizer`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Parse | <1µs | Tolerant parse of one reference |
//! | Sort | Linear-log | Keys computed per comparison |
//! | Bibelstellen page | <50ms | 1000 documents, 20 references each |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use aco_atlas::{
    build_bible_index, BibleRefRecord, DocumentIndex, DocumentMeta, OsisNormalizer,
    RefOccurrence, ReferenceAggregate,
};

const SAMPLES: [&str; 8] = [
    "Gen.3.16", "Gen.3.16-18", "Ps.23", "Sir.3.1-4", "Matt.5.3", "1Cor.13.4", "Rev.22.21", "Xyz.1.1",
];

/// Deterministic synthetic references spread over the canon.
fn make_references(normalizer: &OsisNormalizer, count: usize) -> Vec<String> {
    let books: Vec<&str> = normalizer.canon().books().collect();
    (0..count)
        .map(|i| {
            let book = books[(i * 7) % books.len()];
            format!("{}.{}.{}", book, 1 + (i * 13) % 50, 1 + (i * 31) % 40)
        })
        .collect()
}

fn make_records(normalizer: &OsisNormalizer, docs: usize, refs_per_doc: usize) -> Vec<BibleRefRecord> {
    let refs = make_references(normalizer, docs * refs_per_doc);
    refs.chunks(refs_per_doc)
        .enumerate()
        .map(|(i, chunk)| {
            let occurrences = chunk
                .iter()
                .map(|osis| {
                    let book = osis.split('.').next().unwrap_or_default();
                    RefOccurrence::new(book, osis.as_str())
                })
                .collect();
            BibleRefRecord::new(format!("doc-{}", i), occurrences)
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let normalizer = OsisNormalizer::default();
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(SAMPLES.len() as u64));

    group.bench_function("tolerant", |b| {
        b.iter(|| {
            for text in SAMPLES {
                black_box(normalizer.parse(black_box(text)));
            }
        })
    });
    group.bench_function("order_key", |b| {
        b.iter(|| {
            for text in SAMPLES {
                black_box(normalizer.order_key(black_box(text)));
            }
        })
    });
    group.bench_function("format_display", |b| {
        b.iter(|| {
            for text in SAMPLES {
                black_box(normalizer.format_display(black_box(text)));
            }
        })
    });

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let normalizer = OsisNormalizer::default();
    let mut group = c.benchmark_group("sort");

    for count in [100, 1_000, 10_000] {
        let refs = make_references(&normalizer, count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("compare", count), &refs, |b, refs| {
            b.iter(|| {
                let mut sorted = refs.clone();
                sorted.sort_by(|a, b| normalizer.compare(a, b));
                sorted
            })
        });
        group.bench_with_input(BenchmarkId::new("cached_key", count), &refs, |b, refs| {
            b.iter(|| {
                let mut sorted = refs.clone();
                sorted.sort_by_cached_key(|r| normalizer.order_key(r));
                sorted
            })
        });
    }

    group.finish();
}

fn bench_pages(c: &mut Criterion) {
    let normalizer = OsisNormalizer::default();
    let mut group = c.benchmark_group("bibelstellen");

    for docs in [10, 100, 1_000] {
        let records = make_records(&normalizer, docs, 20);
        let index = DocumentIndex::new(
            (0..docs).map(|i| DocumentMeta::new(format!("doc-{}", i)).with_doc_num(i.to_string())),
        );
        group.throughput(Throughput::Elements((docs * 20) as u64));

        group.bench_with_input(BenchmarkId::new("aggregate", docs), &records, |b, records| {
            b.iter(|| ReferenceAggregate::build(black_box(records)))
        });
        group.bench_with_input(BenchmarkId::new("page", docs), &records, |b, records| {
            b.iter(|| build_bible_index(black_box(records), &index, &normalizer))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_sort, bench_pages);
criterion_main!(benches);
