// Integration tests for the per-entity indexers

use crate::common::fixtures::{
    ALIAS_FILE, CSV_FILE, NOTES_FILE, NOTES_TEXT, PROJECT_ID, SCAN_FILE,
};
use crate::common::{assert_complete, create_test_env, research_store, write_file_bytes, TestEnv};
use mcindex::core::indexer::Scope;
use mcindex::core::types::EntityKind;
use serde_json::{json, Value};

fn indexed_env() -> TestEnv {
    let env = create_test_env(research_store());
    write_file_bytes(&env.content_root());
    env
}

fn stored(env: &TestEnv, kind: EntityKind, id: &str) -> Value {
    env.engine()
        .get("mc", kind, id)
        .unwrap()
        .unwrap_or_else(|| panic!("{kind} {id} not indexed"))
}

#[test]
fn test_index_all_covers_every_kind() {
    let env = indexed_env();

    let reports = env.services.index_all().unwrap();

    let kinds: Vec<EntityKind> = reports.iter().map(|r| r.doc_type).collect();
    assert_eq!(kinds, EntityKind::ALL.to_vec());

    let totals: Vec<usize> = reports.iter().map(|r| r.total).collect();
    // projects, users, processes, samples, files
    assert_eq!(totals, vec![1, 2, 1, 2, 4]);

    for report in &reports {
        assert_complete(report);
    }
    assert_eq!(env.engine().num_docs(), 10);
}

#[test]
fn test_file_document_joins_directory_tags_and_notes() {
    let env = indexed_env();
    env.services.index(EntityKind::File, &Scope::All).unwrap();

    let doc = stored(&env, EntityKind::File, NOTES_FILE);
    assert_eq!(doc["otype"], "datafile");
    assert_eq!(doc["name"], "furnace.txt");
    assert_eq!(doc["path"], "Titanium fatigue/raw");
    assert_eq!(doc["datadir_id"], "d-1");
    assert_eq!(doc["project_id"], PROJECT_ID);
    assert_eq!(doc["tags"], json!([{"tag": "ti64"}]));
    assert_eq!(doc["notes"][0]["title"], "Furnace");
    assert_eq!(doc["contents"], NOTES_TEXT);
}

#[test]
fn test_file_contents_by_media_type() {
    let env = indexed_env();
    env.services.index(EntityKind::File, &Scope::All).unwrap();

    // Aliased entry indexes the bytes it points to
    assert_eq!(stored(&env, EntityKind::File, ALIAS_FILE)["contents"], NOTES_TEXT);
    // First non-comment, non-empty line of a CSV
    assert_eq!(stored(&env, EntityKind::File, CSV_FILE)["contents"], "load,cycles");
    // Images carry no text
    assert_eq!(stored(&env, EntityKind::File, SCAN_FILE)["contents"], "");
}

#[test]
fn test_missing_bytes_index_with_empty_contents() {
    // No bytes written under the content root
    let env = create_test_env(research_store());

    let report = env.services.index(EntityKind::File, &Scope::All).unwrap();

    assert_complete(&report);
    assert_eq!(stored(&env, EntityKind::File, NOTES_FILE)["contents"], "");
}

#[test]
fn test_tool_extraction_for_documents() {
    let mut store = research_store();
    store.insert(
        "project2datafile",
        vec![json!({"id": "p2df-pdf", "project_id": PROJECT_ID, "datafile_id": "abc-tuvw-333"})],
    );
    store.insert(
        "datadir2datafile",
        vec![json!({"id": "dd2df-pdf", "datadir_id": "d-1", "datafile_id": "abc-tuvw-333"})],
    );
    store.insert(
        "datafiles",
        vec![json!({
            "id": "abc-tuvw-333",
            "name": "report.pdf",
            "mediatype": {"mime": "application/pdf"},
            "size": 9
        })],
    );
    let env = create_test_env(store);
    let pdf = crate::common::fixtures::shard_path(&env.content_root(), "abc-tuvw-333");
    std::fs::create_dir_all(pdf.parent().unwrap()).unwrap();
    std::fs::write(&pdf, b"%PDF-1.4\n").unwrap();

    env.services
        .index(EntityKind::File, &Scope::One("abc-tuvw-333".to_string()))
        .unwrap();

    assert_eq!(
        stored(&env, EntityKind::File, "abc-tuvw-333")["contents"],
        "extracted by tool"
    );
}

#[test]
fn test_sample_document_embeds_properties_and_files() {
    let env = indexed_env();
    let report = env.services.index(EntityKind::Sample, &Scope::All).unwrap();
    assert_complete(&report);

    let s1 = stored(&env, EntityKind::Sample, "s-1");
    assert_eq!(s1["otype"], "sample");
    assert_eq!(s1["name"], "Coupon A");
    assert_eq!(
        s1["properties"],
        json!([{"attribute": "composition", "name": "Composition"}])
    );
    assert_eq!(s1["files"][0]["datafile_id"], NOTES_FILE);
    assert_eq!(s1["files"][0]["contents"], NOTES_TEXT);

    let s2 = stored(&env, EntityKind::Sample, "s-2");
    assert_eq!(s2["properties"], json!([]));
}

#[test]
fn test_process_document_has_setup() {
    let env = indexed_env();
    env.services.index(EntityKind::Process, &Scope::All).unwrap();

    let doc = stored(&env, EntityKind::Process, "pc-1");
    assert_eq!(doc["_type"], "process");
    assert!(doc.get("id").is_none());
    assert_eq!(doc["setup"][0]["units"], "C");
    assert_eq!(doc["setup"][0]["value"], 800);
}

#[test]
fn test_user_documents_omit_credentials() {
    let env = indexed_env();
    env.services.index(EntityKind::User, &Scope::All).unwrap();

    let doc = stored(&env, EntityKind::User, "alice@example.org");
    assert_eq!(doc["fullname"], "Alice Smith");
    assert!(doc.get("apikey").is_none());
    assert!(doc.get("password").is_none());
}

#[test]
fn test_reindex_is_an_upsert() {
    let env = indexed_env();

    env.services.index(EntityKind::Sample, &Scope::All).unwrap();
    let before = env.engine().num_docs();

    let report = env
        .services
        .index(EntityKind::Sample, &Scope::One("s-1".to_string()))
        .unwrap();
    assert_eq!(report.total, 1);

    env.services.index(EntityKind::Sample, &Scope::All).unwrap();

    assert_eq!(env.engine().num_docs(), before);
    assert_eq!(env.engine().count("mc", EntityKind::Sample, "s-1").unwrap(), 1);
}

#[test]
fn test_scoped_run_only_touches_listed_ids() {
    let env = indexed_env();

    let report = env
        .services
        .index(
            EntityKind::File,
            &Scope::Many(vec![NOTES_FILE.to_string(), CSV_FILE.to_string()]),
        )
        .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(env.engine().count("mc", EntityKind::File, SCAN_FILE).unwrap(), 0);
}
