//! Performance benchmarks for identifier resolution.
//!
//! Run with: `cargo bench --bench resolution`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use document_resolver::convert::prefer_external_storage;
use document_resolver::{
    find_covering, DocumentIdentifier, DocumentProvider, DocumentResolver, Grant,
    InMemoryProvider, ListMode, ProviderKind,
};

fn id(raw: &str) -> DocumentIdentifier {
    DocumentIdentifier::parse(raw).unwrap()
}

/// Provider with `width` files per directory, `depth` directories deep.
fn build_tree(width: usize, depth: usize) -> InMemoryProvider {
    let mut p = InMemoryProvider::new();
    let mut dir_encoded = "primary:Download".to_string();
    let mut dir = id(&format!("external-storage:{dir_encoded}"));
    p.insert_directory(dir.clone());

    for level in 0..depth {
        for file in 0..width {
            let child = id(&format!("external-storage:{dir_encoded}/file{file}.json"));
            p.insert_file(child.clone());
            p.link_child(&dir, &child);
        }
        let next_encoded = format!("{dir_encoded}/sub{level}");
        let next = id(&format!("external-storage:{next_encoded}"));
        p.insert_directory(next.clone());
        p.link_child(&dir, &next);
        dir_encoded = next_encoded;
        dir = next;
    }
    p
}

fn bench_parse(c: &mut Criterion) {
    let raws = [
        "external-storage:primary:Download/report.json",
        "tree:external-storage:primary:Download",
        "legacy-downloads:raw:/storage/emulated/0/Download/report.json",
    ];

    let mut group = c.benchmark_group("parse");
    for raw in raws {
        group.bench_with_input(BenchmarkId::from_parameter(raw), raw, |b, raw| {
            b.iter(|| DocumentIdentifier::parse(black_box(raw)))
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| ProviderKind::classify(black_box("legacy-downloads")))
    });
}

fn bench_convert(c: &mut Criterion) {
    let legacy = id("legacy-downloads:raw:/storage/emulated/0/Download/sub/report.json");
    c.bench_function("convert/legacy_to_external", |b| {
        b.iter(|| prefer_external_storage(black_box(&legacy)))
    });
}

fn bench_find_covering(c: &mut Criterion) {
    let grants: Vec<Grant> = (0..50)
        .map(|i| Grant::new(id(&format!("tree:external-storage:primary:Folder{i}"))))
        .collect();
    let requested = id("external-storage:primary:Folder25/sub/deep/file.json");

    c.bench_function("find_covering/50_grants", |b| {
        b.iter(|| find_covering(black_box(&requested), black_box(&grants)))
    });
}

fn bench_resolve_children(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_children");
    for width in [10usize, 100] {
        let provider = build_tree(width, 4);
        provider
            .persist_grant(&id("tree:external-storage:primary:Download"))
            .unwrap();
        let resolver = DocumentResolver::new(Arc::new(provider));
        let root = id("tree:external-storage:primary:Download");

        group.bench_with_input(BenchmarkId::new("flat", width), &root, |b, root| {
            b.iter(|| resolver.resolve_children(black_box(root), ListMode::Flat))
        });
        group.bench_with_input(BenchmarkId::new("recursive", width), &root, |b, root| {
            b.iter(|| resolver.resolve_children(black_box(root), ListMode::Recursive))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_classify,
    bench_convert,
    bench_find_covering,
    bench_resolve_children,
);
criterion_main!(benches);
