//! Change-driven re-sync.
//!
//! Record-store change notifications are turned into multi-entity
//! reindex runs so the search index follows creates, updates and
//! deletes without a full rebuild. A file change also reindexes every
//! sample that references the file, since samples embed their files.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::core::error::{IndexError, Result};
use crate::core::indexer::{EntityIndexers, IndexReport, Scope};
use crate::core::store::{Query, RecordSource};
use crate::core::types::EntityKind;

const DATAFILE_ITEM: &str = "datafile";

/// A change to one row of the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table")]
pub enum ChangeEvent {
    #[serde(rename = "datafiles")]
    File { id: String },
    #[serde(rename = "project2datafile")]
    ProjectFile { datafile_id: String },
    #[serde(rename = "samples")]
    Sample { id: String },
    #[serde(rename = "sample2datafile")]
    SampleFile { sample_id: String },
    #[serde(rename = "propertyset2property")]
    PropertySet { property_set_id: String },
    #[serde(rename = "processes")]
    Process { id: String },
    #[serde(rename = "projects")]
    Project { id: String },
    #[serde(rename = "users")]
    User { id: String },
    #[serde(rename = "notes")]
    Note { id: String },
    #[serde(rename = "note2item")]
    NoteItem { item_type: String, item_id: String },
    #[serde(rename = "tag2item")]
    Tag { item_type: String, item_id: String },
}

impl ChangeEvent {
    /// Build an event from a change-feed entry.
    ///
    /// The old row wins when it carries the key field (update or
    /// delete); otherwise the new row is used (insert). Returns `None`
    /// for tables that do not affect the index.
    pub fn from_feed(table: &str, old_val: &Value, new_val: &Value) -> Option<Self> {
        let get = |key: &str| {
            pick(old_val, new_val, key)
                .and_then(|row| field(row, key))
                .map(str::to_string)
        };

        let event = match table {
            "datafiles" => ChangeEvent::File { id: get("id")? },
            "project2datafile" => {
                let row = pick(old_val, new_val, "id")?;
                ChangeEvent::ProjectFile {
                    datafile_id: field(row, "datafile_id")?.to_string(),
                }
            }
            "samples" => ChangeEvent::Sample { id: get("id")? },
            "sample2datafile" => ChangeEvent::SampleFile {
                sample_id: get("sample_id")?,
            },
            "propertyset2property" => {
                let row = pick(old_val, new_val, "id")?;
                ChangeEvent::PropertySet {
                    property_set_id: field(row, "property_set_id")?.to_string(),
                }
            }
            "processes" => ChangeEvent::Process { id: get("id")? },
            "projects" => ChangeEvent::Project { id: get("id")? },
            "users" => ChangeEvent::User { id: get("id")? },
            "notes" => ChangeEvent::Note { id: get("id")? },
            "note2item" | "tag2item" => {
                let row = pick(old_val, new_val, "item_id")?;
                let item_type = field(row, "item_type").unwrap_or_default().to_string();
                let item_id = field(row, "item_id")?.to_string();
                if table == "note2item" {
                    ChangeEvent::NoteItem { item_type, item_id }
                } else {
                    ChangeEvent::Tag { item_type, item_id }
                }
            }
            _ => return None,
        };

        Some(event)
    }
}

fn field<'a>(row: &'a Value, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str)
}

/// The first of old/new rows with a non-empty `key`
fn pick<'a>(old_val: &'a Value, new_val: &'a Value, key: &str) -> Option<&'a Value> {
    [old_val, new_val]
        .into_iter()
        .find(|row| field(row, key).is_some_and(|v| !v.is_empty()))
}

/// Reindex work derived from a change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReindexTarget {
    pub kind: EntityKind,
    pub ids: Vec<String>,
}

/// Applies change events to the search index
#[derive(Clone)]
pub struct ChangeSync {
    source: Arc<dyn RecordSource>,
    indexers: EntityIndexers,
}

impl ChangeSync {
    pub fn new(source: Arc<dyn RecordSource>, indexers: EntityIndexers) -> Self {
        Self { source, indexers }
    }

    /// Work needed to bring the index up to date with `event`
    pub fn plan(&self, event: &ChangeEvent) -> Result<Vec<ReindexTarget>> {
        let mut targets = Vec::new();

        match event {
            ChangeEvent::File { id } | ChangeEvent::ProjectFile { datafile_id: id } => {
                push(&mut targets, EntityKind::File, vec![id.clone()]);
                if matches!(event, ChangeEvent::File { .. }) {
                    push(&mut targets, EntityKind::Sample, self.samples_using(&[id.clone()])?);
                }
            }
            ChangeEvent::Sample { id } | ChangeEvent::SampleFile { sample_id: id } => {
                push(&mut targets, EntityKind::Sample, vec![id.clone()]);
            }
            ChangeEvent::PropertySet { property_set_id } => {
                let query = Query::get_all_by(
                    "sample2propertyset",
                    "property_set_id",
                    &[property_set_id.clone()],
                );
                push(&mut targets, EntityKind::Sample, self.column(&query, "sample_id")?);
            }
            ChangeEvent::Process { id } => {
                push(&mut targets, EntityKind::Process, vec![id.clone()])
            }
            ChangeEvent::Project { id } => {
                push(&mut targets, EntityKind::Project, vec![id.clone()])
            }
            ChangeEvent::User { id } => push(&mut targets, EntityKind::User, vec![id.clone()]),
            ChangeEvent::Note { id } => {
                let query = Query::get_all_by("note2item", "note_id", &[id.clone()]);
                let files: Vec<String> = self
                    .rows(&query)?
                    .iter()
                    .filter(|row| field(row, "item_type") == Some(DATAFILE_ITEM))
                    .filter_map(|row| field(row, "item_id").map(str::to_string))
                    .collect();
                let samples = self.samples_using(&files)?;
                push(&mut targets, EntityKind::File, files);
                push(&mut targets, EntityKind::Sample, samples);
            }
            ChangeEvent::NoteItem { item_type, item_id }
            | ChangeEvent::Tag { item_type, item_id } => {
                if item_type == DATAFILE_ITEM {
                    push(&mut targets, EntityKind::File, vec![item_id.clone()]);
                    push(&mut targets, EntityKind::Sample, self.samples_using(&[item_id.clone()])?);
                }
            }
        }

        Ok(targets)
    }

    /// Plan and run the reindex for one event
    pub fn apply(&self, event: &ChangeEvent) -> Result<Vec<IndexReport>> {
        let targets = self.plan(event)?;
        tracing::info!(event = ?event, targets = targets.len(), "Applying change");

        targets
            .into_iter()
            .map(|target| self.indexers.run(target.kind, &Scope::from_ids(target.ids)))
            .collect()
    }

    fn samples_using(&self, file_ids: &[String]) -> Result<Vec<String>> {
        if file_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::get_all_by("sample2datafile", "datafile_id", file_ids);
        self.column(&query, "sample_id")
    }

    fn rows(&self, query: &Query) -> Result<Vec<Value>> {
        let mut cursor = self.source.execute(query)?;
        let mut rows = Vec::new();
        while let Some(row) = cursor.next() {
            rows.push(row);
        }
        let err = cursor.err();
        cursor.close();
        match err {
            Some(e) => Err(IndexError::Cursor(e.to_string())),
            None => Ok(rows),
        }
    }

    /// Distinct string values of one column, in first-seen order
    fn column(&self, query: &Query, key: &str) -> Result<Vec<String>> {
        let mut values: Vec<String> = Vec::new();
        for row in self.rows(query)? {
            if let Some(v) = field(&row, key) {
                if !values.iter().any(|seen| seen == v) {
                    values.push(v.to_string());
                }
            }
        }
        Ok(values)
    }
}

/// Add a target unless it has no ids
fn push(targets: &mut Vec<ReindexTarget>, kind: EntityKind, ids: Vec<String>) {
    if !ids.is_empty() {
        targets.push(ReindexTarget { kind, ids });
    }
}
