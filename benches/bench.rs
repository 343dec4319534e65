//! Criterion benchmarks for indexing and searching a synthetic workspace.
//!
//! The workload mirrors a full-source workspace performance run:
//! - indexing every container from scratch
//! - type, field, method and constructor searches over all occurrences
//! - listing all type names

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use symdex::config::SymdexConfig;
use symdex::document::{ContainerId, Document, MemoryContainerProvider, MemoryDocumentSource};
use symdex::manager::IndexManager;
use symdex::search::{
    CountingCollector, LimitTo, QueryPattern, SearchFor, SearchScope, TypeNameCollector,
    TypeNameQuery, WaitPolicy,
};

const CONTAINERS: usize = 8;
const DOCUMENTS_PER_CONTAINER: usize = 40;

/// Generate one source file referencing a shared core type.
fn generate_document(container: usize, index: usize) -> String {
    format!(
        r#"package org.bench.p{container};

import org.bench.core.JavaCore;

public class Type{index} implements Comparable<Type{index}> {{
    public static final int FILE = {index};
    private final String name;
    private JavaCore core = JavaCore.getInstance();

    public Type{index}(String name) {{
        this.name = new String(name);
    }}

    public boolean equals(Object other) {{
        return other instanceof Type{index} && name.equals(((Type{index}) other).name);
    }}

    public int compareTo(Type{index} other) {{
        return Integer.compare(FILE, other.FILE);
    }}

    interface Listener{index} {{
        void changed(JavaCore core);
    }}
}}
"#
    )
}

fn generate_workspace() -> (Arc<MemoryDocumentSource>, MemoryContainerProvider) {
    let source = Arc::new(MemoryDocumentSource::new());
    let provider = MemoryContainerProvider::new();

    source.insert(
        "/core",
        "org/bench/core/JavaCore.java",
        "package org.bench.core;\npublic class JavaCore { public static JavaCore getInstance() { return new JavaCore(); } }\n",
    );
    provider.insert("/core", vec![Document::new("org/bench/core/JavaCore.java", 1)]);

    for container in 0..CONTAINERS {
        let id = ContainerId::new(format!("/p{container}"));
        let mut documents = Vec::with_capacity(DOCUMENTS_PER_CONTAINER);
        for index in 0..DOCUMENTS_PER_CONTAINER {
            let path = format!("org/bench/p{container}/Type{index}.java");
            source.insert(id.clone(), path.clone(), generate_document(container, index));
            documents.push(Document::new(path, 1));
        }
        provider.insert(id, documents);
    }

    (source, provider)
}

fn bench_indexing(c: &mut Criterion) {
    let (source, provider) = generate_workspace();
    let manager = IndexManager::open(SymdexConfig::in_memory()).unwrap();
    let indexer = manager.indexer(source);

    let mut group = c.benchmark_group("indexing");
    group.throughput(Throughput::Elements(
        (CONTAINERS * DOCUMENTS_PER_CONTAINER + 1) as u64,
    ));
    group.bench_function("index_all", |b| {
        b.iter(|| {
            indexer.reset().unwrap();
            for ticket in indexer.index_all(&provider).unwrap() {
                black_box(ticket.wait().unwrap());
            }
        })
    });
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let (source, provider) = generate_workspace();
    let manager = IndexManager::open(SymdexConfig::in_memory()).unwrap();
    manager.indexer(source).index_all(&provider).unwrap();
    manager.wait_until_idle().unwrap();

    let engine = manager.search_engine();
    let scope = SearchScope::workspace();

    let mut group = c.benchmark_group("search");
    for (name, text, search_for) in [
        ("type", "JavaCore", SearchFor::Type),
        ("field", "FILE", SearchFor::Field),
        ("method", "equals", SearchFor::Method),
        ("constructor", "String", SearchFor::Constructor),
    ] {
        let pattern = QueryPattern::new(text, search_for, LimitTo::AllOccurrences);
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut collector = CountingCollector::new();
                engine.search(&pattern, &scope, &mut collector).unwrap();
                black_box(collector.count())
            })
        });
    }

    group.bench_function("all_type_names", |b| {
        b.iter(|| {
            let mut requestor = TypeNameCollector::new();
            engine
                .search_all_type_names(
                    &TypeNameQuery::all(),
                    &scope,
                    &mut requestor,
                    WaitPolicy::WaitUntilReady,
                )
                .unwrap();
            black_box(requestor.types.len())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_indexing, bench_search);
criterion_main!(benches);
