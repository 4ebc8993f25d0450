//! Search engine boundary.
//!
//! Indexers hand the engine [`BulkBatch`]es of documents keyed by
//! (index, type, id). Submitting the same key twice replaces the
//! earlier document. [`TantivyBackend`] is the bundled engine.

mod tantivy;

pub use self::tantivy::TantivyBackend;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::Result;
use crate::core::types::EntityKind;

/// One document to upsert
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRequest {
    pub index: String,
    pub doc_type: EntityKind,
    pub id: String,
    pub document: Value,
}

impl IndexRequest {
    /// Engine-wide unique key
    pub fn uid(&self) -> String {
        document_uid(&self.index, self.doc_type, &self.id)
    }
}

pub(crate) fn document_uid(index: &str, doc_type: EntityKind, id: &str) -> String {
    format!("{index}/{}/{id}", doc_type.label())
}

/// An ordered group of index requests submitted together
#[derive(Debug, Clone, Default)]
pub struct BulkBatch {
    requests: Vec<IndexRequest>,
}

impl BulkBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, request: IndexRequest) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Document ids in submission order
    pub fn ids(&self) -> Vec<String> {
        self.requests.iter().map(|r| r.id.clone()).collect()
    }

    pub fn requests(&self) -> &[IndexRequest] {
        &self.requests
    }
}

/// Engine acknowledgement of a committed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkResponse {
    pub items: usize,
    pub took_ms: u64,
}

/// A search engine that accepts bulk upserts
pub trait SearchBackend: Send + Sync {
    fn submit(&self, batch: BulkBatch) -> Result<BulkResponse>;
}

/// A ranked search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub score: f32,
    pub doc_type: String,
    pub id: String,
    pub document: Value,
}
