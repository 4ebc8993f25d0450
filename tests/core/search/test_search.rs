// Integration tests for search over indexed entities

use crate::common::fixtures::NOTES_FILE;
use crate::common::{create_test_env, research_store, write_file_bytes, TestEnv};
use mcindex::core::search::TantivyBackend;
use mcindex::core::types::EntityKind;

fn indexed() -> TestEnv {
    let env = create_test_env(research_store());
    write_file_bytes(&env.content_root());
    env.services.index_all().unwrap();
    env
}

#[test]
fn test_search_extracted_contents() {
    let env = indexed();

    let hits = env.services.search("thermocouple", Some(EntityKind::File), 10).unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, NOTES_FILE);
    assert_eq!(hits[0].doc_type, "datafile");
    assert!(hits[0].score > 0.0);
}

#[test]
fn test_search_spans_kinds() {
    let env = indexed();

    // "furnace" appears in file text and in the samples embedding that file
    let hits = env.services.search("furnace", None, 10).unwrap();
    let kinds: Vec<&str> = hits.iter().map(|h| h.doc_type.as_str()).collect();

    assert!(kinds.contains(&"datafile"));
    assert!(kinds.contains(&"sample"));
}

#[test]
fn test_kind_filter_excludes_other_types() {
    let env = indexed();

    let hits = env.services.search("titanium", Some(EntityKind::Project), 10).unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "p-1");
    assert_eq!(hits[0].document["name"], "Titanium fatigue");
}

#[test]
fn test_boolean_query() {
    let env = indexed();

    let hits = env
        .services
        .search("coupon AND heat", Some(EntityKind::Sample), 10)
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "s-2");
}

#[test]
fn test_empty_query_is_rejected() {
    let env = indexed();
    let err = env.services.search("   ", None, 10).unwrap_err();
    assert!(err.is_bad_request());
}

#[test]
fn test_index_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let index_dir = dir.path().join("index");

    {
        let mut config = crate::common::helpers::test_config(dir.path());
        config.storage.index_dir = index_dir.clone();
        let services = mcindex::core::services::Services::new(
            config,
            std::sync::Arc::new(research_store()),
        )
        .unwrap();
        services.index(EntityKind::User, &mcindex::core::indexer::Scope::All).unwrap();
    }

    let reopened = TantivyBackend::open_or_create(&index_dir, 50_000_000).unwrap();
    assert_eq!(reopened.num_docs(), 2);
    assert_eq!(reopened.count("mc", EntityKind::User, "bob@example.org").unwrap(), 1);
}

#[test]
fn test_searcher_and_indexer_share_index_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = crate::common::helpers::test_config(dir.path());
    let source = std::sync::Arc::new(research_store());

    let serving = mcindex::core::services::Services::new(config.clone(), source.clone()).unwrap();
    let indexing = mcindex::core::services::Services::new(config, source).unwrap();

    indexing.index(EntityKind::Project, &mcindex::core::indexer::Scope::All).unwrap();

    let hits = serving.search("titanium", Some(EntityKind::Project), 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "p-1");
}
