// Integration tests for batch thresholds and run reports

use crate::common::{assert_complete, create_test_env_with, project_store, research_store};
use mcindex::core::error::IndexError;
use mcindex::core::indexer::{BulkIndexer, Scope};
use mcindex::core::search::TantivyBackend;
use mcindex::core::store::{MemoryStore, Query};
use mcindex::core::types::{EntityKind, ProjectDocument};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_batches_follow_configured_threshold() {
    let env = create_test_env_with(project_store(25), |c| c.indexing.project_batch_size = 10);

    let report = env.services.index(EntityKind::Project, &Scope::All).unwrap();

    let sizes: Vec<usize> = report.batches.iter().map(|b| b.ids.len()).collect();
    assert_eq!(sizes, vec![10, 10, 5]);
    assert_complete(&report);
    assert_eq!(env.engine().num_docs(), 25);
}

#[test]
fn test_exact_multiple_has_no_empty_tail() {
    let env = create_test_env_with(project_store(20), |c| c.indexing.project_batch_size = 10);

    let report = env.services.index(EntityKind::Project, &Scope::All).unwrap();

    assert_eq!(report.batches.len(), 2);
    assert!(report.batches.iter().all(|b| !b.ids.is_empty()));
}

#[test]
fn test_file_batches_default_to_ten() {
    let env = create_test_env_with(research_store(), |_| {});

    let indexer = env.services.indexers.files(&Scope::All);
    assert_eq!(indexer.max_count(), 10);

    let report = indexer.run().unwrap();
    assert_eq!(report.batches.len(), 1);
}

#[test]
fn test_missing_table_is_a_query_error() {
    // Processes need the join tables, which this store lacks
    let env = create_test_env_with(project_store(3), |_| {});

    let err = env.services.index(EntityKind::Process, &Scope::All).unwrap_err();
    // The innermost join table is looked up first
    assert!(matches!(err, IndexError::Query(_)));
    assert!(err.to_string().contains("project2process"));
    assert_eq!(env.engine().num_docs(), 0);
}

#[test]
fn test_undecodable_row_stops_the_run_and_keeps_partial_work() {
    let store = MemoryStore::new().with_table(
        "projects",
        vec![
            json!({"id": "p-1", "name": "first"}),
            json!({"name": "no id"}),
            json!({"id": "p-3", "name": "never read"}),
        ],
    );
    let backend = Arc::new(TantivyBackend::in_memory(50_000_000).unwrap());

    let indexer: BulkIndexer<ProjectDocument> = BulkIndexer::new(
        "mc",
        Query::table("projects"),
        Arc::new(store),
        backend.clone(),
        |p: &ProjectDocument| p.id.clone(),
    );
    let report = indexer.run().unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(report.committed(), 1);
    assert!(report.cursor_error.is_some());
    assert!(!report.is_complete());
    assert!(report.into_result().is_err());
    assert_eq!(backend.num_docs(), 1);
}
