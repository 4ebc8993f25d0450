// Test fixtures: a small research-data record store and its file bytes

use mcindex::core::store::MemoryStore;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

#[allow(dead_code)]
pub const PROJECT_ID: &str = "p-1";
#[allow(dead_code)]
pub const NOTES_FILE: &str = "abc-defg-456";
#[allow(dead_code)]
pub const SCAN_FILE: &str = "abc-hijk-789";
/// Shares the bytes of `NOTES_FILE`
#[allow(dead_code)]
pub const ALIAS_FILE: &str = "abc-lmno-111";
#[allow(dead_code)]
pub const CSV_FILE: &str = "abc-pqrs-222";
#[allow(dead_code)]
pub const API_KEY: &str = "k-alice";

#[allow(dead_code)]
pub const NOTES_TEXT: &str = "annealing furnace log\nheld at 800C for two hours\n";

fn link(id: &str, fields: Value) -> Value {
    let mut row = fields;
    row["id"] = json!(id);
    row
}

fn datafile(id: &str, name: &str, mime: &str, size: i64, uses_id: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "mediatype": {"mime": mime, "description": ""},
        "size": size,
        "owner": "alice@example.org",
        "current": true,
        "usesid": uses_id,
        "birthtime": "2016-03-01T12:00:00Z",
        "mtime": "2016-03-02T08:30:00Z"
    })
}

/// Every table the entity indexers touch, with one project holding
/// four files, two samples and one process
#[allow(dead_code)]
pub fn research_store() -> MemoryStore {
    let files = [NOTES_FILE, SCAN_FILE, ALIAS_FILE, CSV_FILE];
    let notes_size = NOTES_TEXT.len() as i64;

    MemoryStore::new()
        .with_table(
            "projects",
            vec![json!({
                "id": PROJECT_ID,
                "name": "Titanium fatigue",
                "description": "Fatigue of additively built titanium",
                "datadir": "d-1",
                "owner": "alice@example.org",
                "birthtime": "2016-03-01T12:00:00Z",
                "mtime": "2016-03-01T12:00:00Z"
            })],
        )
        .with_table(
            "users",
            vec![
                json!({
                    "id": "alice@example.org",
                    "email": "alice@example.org",
                    "fullname": "Alice Smith",
                    "affiliation": "University of Michigan",
                    "apikey": API_KEY,
                    "password": "hashed-secret"
                }),
                json!({
                    "id": "bob@example.org",
                    "email": "bob@example.org",
                    "fullname": "Bob Jones",
                    "apikey": "k-bob"
                }),
            ],
        )
        .with_table(
            "project2datafile",
            files
                .iter()
                .enumerate()
                .map(|(i, f)| {
                    let row = json!({"project_id": PROJECT_ID, "datafile_id": f});
                    link(&format!("p2df-{i}"), row)
                })
                .collect(),
        )
        .with_table(
            "datadir2datafile",
            files
                .iter()
                .enumerate()
                .map(|(i, f)| {
                    link(&format!("dd2df-{i}"), json!({"datadir_id": "d-1", "datafile_id": f}))
                })
                .collect(),
        )
        .with_table(
            "datadirs",
            vec![json!({"id": "d-1", "name": "Titanium fatigue/raw", "project": PROJECT_ID})],
        )
        .with_table(
            "datafiles",
            vec![
                datafile(NOTES_FILE, "furnace.txt", "text/plain", notes_size, ""),
                datafile(SCAN_FILE, "micrograph.tif", "image/tiff", 64, ""),
                datafile(ALIAS_FILE, "furnace-copy.txt", "text/plain", notes_size, NOTES_FILE),
                datafile(CSV_FILE, "loads.csv", "text/csv", 40, ""),
            ],
        )
        .with_table(
            "tag2item",
            vec![json!({
                "id": "t2i-1",
                "tag_id": "ti64",
                "item_id": NOTES_FILE,
                "item_type": "datafile"
            })],
        )
        .with_table(
            "note2item",
            vec![json!({
                "id": "n2i-1",
                "note_id": "n-1",
                "item_id": NOTES_FILE,
                "item_type": "datafile"
            })],
        )
        .with_table(
            "notes",
            vec![json!({"id": "n-1", "title": "Furnace", "note": "thermocouple recalibrated"})],
        )
        .with_table(
            "project2sample",
            vec![
                link("p2s-1", json!({"project_id": PROJECT_ID, "sample_id": "s-1"})),
                link("p2s-2", json!({"project_id": PROJECT_ID, "sample_id": "s-2"})),
            ],
        )
        .with_table(
            "samples",
            vec![
                json!({
                    "id": "s-1",
                    "name": "Coupon A",
                    "description": "as built",
                    "owner": "alice@example.org"
                }),
                json!({
                    "id": "s-2",
                    "name": "Coupon B",
                    "description": "heat treated",
                    "owner": "alice@example.org"
                }),
            ],
        )
        .with_table(
            "sample2propertyset",
            vec![link("s2ps-1", json!({"sample_id": "s-1", "property_set_id": "ps-1"}))],
        )
        .with_table(
            "propertyset2property",
            vec![link("ps2p-1", json!({"property_set_id": "ps-1", "property_id": "pr-1"}))],
        )
        .with_table(
            "properties",
            vec![json!({"id": "pr-1", "attribute": "composition", "name": "Composition"})],
        )
        .with_table(
            "sample2datafile",
            vec![
                link("s2df-1", json!({"sample_id": "s-1", "datafile_id": NOTES_FILE})),
                link("s2df-2", json!({"sample_id": "s-2", "datafile_id": NOTES_FILE})),
            ],
        )
        .with_table(
            "project2process",
            vec![link("p2pc-1", json!({"project_id": PROJECT_ID, "process_id": "pc-1"}))],
        )
        .with_table(
            "processes",
            vec![json!({
                "id": "pc-1",
                "name": "Anneal",
                "process_type": "transform",
                "does_transform": true,
                "what": "stress relief",
                "owner": "alice@example.org"
            })],
        )
        .with_table(
            "process2setup",
            vec![link("pc2su-1", json!({"process_id": "pc-1", "setup_id": "su-1"}))],
        )
        .with_table(
            "setupproperties",
            vec![json!({
                "id": "sp-1",
                "setup_id": "su-1",
                "attribute": "temperature",
                "name": "Temperature",
                "units": "C",
                "value": 800
            })],
        )
}

/// `count` projects with no related rows, for batching tests
#[allow(dead_code)]
pub fn project_store(count: usize) -> MemoryStore {
    MemoryStore::new().with_table(
        "projects",
        (0..count)
            .map(|i| json!({"id": format!("p-{i:03}"), "name": format!("Project {i}")}))
            .collect(),
    )
}

/// Sharded location of a file id under a content root
#[allow(dead_code)]
pub fn shard_path(root: &Path, id: &str) -> PathBuf {
    let segment = id.split('-').nth(1).unwrap();
    root.join(&segment[0..2]).join(&segment[2..4]).join(id)
}

/// Write the bytes of the fixture files under a content root
#[allow(dead_code)]
pub fn write_file_bytes(root: &Path) {
    let write = |path: PathBuf, contents: &[u8]| {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    };

    write(shard_path(root, NOTES_FILE), NOTES_TEXT.as_bytes());
    write(shard_path(root, CSV_FILE), b"# load cell export\n\nload,cycles\n1200,50000\n");

    let scan = shard_path(root, SCAN_FILE);
    write(scan.clone(), b"II*\0tiff-bytes");
    write(
        scan.parent().unwrap().join(".conversion").join(format!("{SCAN_FILE}.jpg")),
        b"\xff\xd8\xff\xe0jpeg-bytes",
    );
}
