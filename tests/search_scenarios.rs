use std::sync::Arc;

use symdex::config::SymdexConfig;
use symdex::document::{ContainerId, Document, MemoryDocumentSource};
use symdex::error::SymdexError;
use symdex::manager::IndexManager;
use symdex::search::{
    Accuracy, CountingCollector, LimitTo, MatchCollector, MatchMode, QueryPattern, SearchFor,
    SearchScope,
};

const FOO: &str = "package demo;\n\npublic class Foo {\n}\n";
const USER: &str = "package demo;\n\npublic class User {\n    private Foo delegate;\n}\n";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn foo_manager() -> IndexManager {
    init_logger();
    let manager = IndexManager::open(SymdexConfig::in_memory()).unwrap();
    let source = Arc::new(MemoryDocumentSource::new());
    source.insert("/demo", "src/demo/Foo.java", FOO);
    source.insert("/demo", "src/demo/User.java", USER);

    manager
        .indexer(source)
        .index_container(
            ContainerId::new("/demo"),
            vec![
                Document::new("src/demo/Foo.java", 1),
                Document::new("src/demo/User.java", 1),
            ],
        )
        .unwrap();
    manager
}

fn count(manager: &IndexManager, pattern: &QueryPattern, scope: &SearchScope) -> usize {
    let mut collector = CountingCollector::new();
    manager
        .search_engine()
        .search(pattern, scope, &mut collector)
        .unwrap();
    assert_eq!(collector.started, 1);
    assert_eq!(collector.finished, 1);
    collector.count()
}

#[test]
fn test_foo_declarations_and_references() {
    let manager = foo_manager();
    let scope = SearchScope::containers(["/demo"]);

    let all = QueryPattern::new("Foo", SearchFor::Type, LimitTo::AllOccurrences);
    let declarations = QueryPattern::new("Foo", SearchFor::Type, LimitTo::Declarations);
    let references = QueryPattern::new("Foo", SearchFor::Type, LimitTo::References);

    assert_eq!(count(&manager, &all, &scope), 2);
    assert_eq!(count(&manager, &declarations, &scope), 1);
    assert_eq!(count(&manager, &references, &scope), 1);
}

#[test]
fn test_reported_spans_point_at_the_name() {
    let manager = foo_manager();
    let mut collector = MatchCollector::new();
    manager
        .search_engine()
        .search(
            &QueryPattern::new("Foo", SearchFor::Type, LimitTo::AllOccurrences),
            &SearchScope::workspace(),
            &mut collector,
        )
        .unwrap();

    let matches = collector.into_matches();
    assert_eq!(matches.len(), 2);
    for m in &matches {
        let content = if m.element.document.as_str().ends_with("Foo.java") {
            FOO
        } else {
            USER
        };
        assert_eq!(&content[m.start..m.end], "Foo");
        assert_eq!(m.accuracy, Accuracy::Exact);
        assert_eq!(m.element.qualified_container_path, "demo");
    }
}

#[test]
fn test_read_after_write() {
    init_logger();
    let manager = IndexManager::open(SymdexConfig::in_memory()).unwrap();
    let source = Arc::new(MemoryDocumentSource::new());
    let indexer = manager.indexer(source.clone());
    let engine = manager.search_engine();
    let pattern = QueryPattern::new("Widget", SearchFor::Type, LimitTo::Declarations);

    for revision in 1..=5u64 {
        let name = format!("Widget{revision}.java");
        source.insert("/w", name.clone(), "class Widget {}");
        indexer
            .index_container(ContainerId::new("/w"), vec![Document::new(name, revision)])
            .unwrap();

        // No explicit wait: the search itself blocks on the scheduler.
        let mut collector = CountingCollector::new();
        engine
            .search(&pattern, &SearchScope::workspace(), &mut collector)
            .unwrap();
        assert_eq!(collector.count(), 1);
    }
}

#[test]
fn test_case_insensitive_exact_match() {
    init_logger();
    let manager = IndexManager::open(SymdexConfig::in_memory()).unwrap();
    let source = Arc::new(MemoryDocumentSource::new());
    source.insert(
        "/org.example.core",
        "JavaCore.java",
        "package org.example.core;\npublic final class JavaCore {}\n",
    );
    manager
        .indexer(source)
        .index_container(
            ContainerId::new("/org.example.core"),
            vec![Document::new("JavaCore.java", 1)],
        )
        .unwrap();

    let scope = SearchScope::workspace();
    let pattern = QueryPattern::new("javacore", SearchFor::Type, LimitTo::AllOccurrences);
    assert_eq!(count(&manager, &pattern, &scope), 0);
    assert_eq!(count(&manager, &pattern.clone().case_insensitive(), &scope), 1);

    let wildcard = QueryPattern::new("java?ore", SearchFor::Type, LimitTo::AllOccurrences)
        .with_match_mode(MatchMode::Pattern)
        .case_insensitive();
    assert_eq!(count(&manager, &wildcard, &scope), 1);
}

#[test]
fn test_empty_scope_still_notifies_collector() {
    let manager = foo_manager();
    let pattern = QueryPattern::new("Foo", SearchFor::Type, LimitTo::AllOccurrences);

    assert_eq!(count(&manager, &pattern, &SearchScope::empty()), 0);
    assert_eq!(
        count(&manager, &pattern, &SearchScope::containers(["/never-indexed"])),
        0
    );
}

#[test]
fn test_invalid_pattern_is_reported_before_callbacks() {
    let manager = foo_manager();
    let mut collector = CountingCollector::new();
    let pattern = QueryPattern::new("Foo\\", SearchFor::Type, LimitTo::AllOccurrences)
        .with_match_mode(MatchMode::Pattern);

    let result = manager
        .search_engine()
        .search(&pattern, &SearchScope::workspace(), &mut collector);
    assert!(matches!(result, Err(SymdexError::InvalidPattern(_))));
    assert_eq!(collector.started, 0);
    assert_eq!(collector.finished, 0);
}

#[test]
fn test_import_counts_as_type_reference() {
    init_logger();
    let manager = IndexManager::open(SymdexConfig::in_memory()).unwrap();
    let source = Arc::new(MemoryDocumentSource::new());
    source.insert("/p", "a/Foo.java", "package a;\nclass Foo {}\n");
    source.insert("/p", "b/Use.java", "package b;\nimport a.Foo;\nclass Use {}\n");
    manager
        .indexer(source)
        .index_container(
            ContainerId::new("/p"),
            vec![Document::new("a/Foo.java", 1), Document::new("b/Use.java", 1)],
        )
        .unwrap();

    let scope = SearchScope::workspace();
    let references = QueryPattern::new("Foo", SearchFor::Type, LimitTo::References);
    let all = QueryPattern::new("Foo", SearchFor::Type, LimitTo::AllOccurrences);
    assert_eq!(count(&manager, &references, &scope), 1);
    assert_eq!(count(&manager, &all, &scope), 2);
}
