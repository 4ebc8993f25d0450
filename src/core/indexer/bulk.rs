//! Generic batching engine.
//!
//! A [`BulkIndexer`] drives a record-store cursor, optionally enriches
//! each decoded document and submits documents to the search engine in
//! batches of at most `max_count`. The run is single-threaded and owns
//! its batch accumulator.

use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use crate::core::error::{IndexError, Result};
use crate::core::search::{BulkBatch, IndexRequest, SearchBackend};
use crate::core::store::{Query, RecordSource};
use crate::core::types::{Document, EntityKind};

type IdFn<D> = Box<dyn Fn(&D) -> String + Send + Sync>;
type EnrichFn<D> = Box<dyn Fn(&mut D) + Send + Sync>;

/// Result of submitting one batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// Document ids in submission order
    pub ids: Vec<String>,
    pub committed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of an indexing run
#[derive(Debug, Serialize)]
pub struct IndexReport {
    pub doc_type: EntityKind,
    /// Documents read from the cursor
    pub total: usize,
    pub batches: Vec<BatchOutcome>,
    /// Set when the cursor stopped early
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_string")]
    pub cursor_error: Option<IndexError>,
    pub duration_ms: u64,
}

fn error_string<S: serde::Serializer>(
    err: &Option<IndexError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match err {
        Some(e) => serializer.serialize_str(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl IndexReport {
    fn new(doc_type: EntityKind) -> Self {
        Self {
            doc_type,
            total: 0,
            batches: Vec::new(),
            cursor_error: None,
            duration_ms: 0,
        }
    }

    /// Documents in batches the engine accepted
    pub fn committed(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.committed)
            .map(|b| b.ids.len())
            .sum()
    }

    /// Ids of documents whose batch was rejected
    pub fn failed_ids(&self) -> Vec<&str> {
        self.batches
            .iter()
            .filter(|b| !b.committed)
            .flat_map(|b| b.ids.iter().map(String::as_str))
            .collect()
    }

    /// True when the cursor was fully read and every batch committed
    pub fn is_complete(&self) -> bool {
        self.cursor_error.is_none() && self.batches.iter().all(|b| b.committed)
    }

    /// Convert a partial run into an error
    pub fn into_result(self) -> Result<Self> {
        if let Some(err) = &self.cursor_error {
            return Err(IndexError::Incomplete {
                doc_type: self.doc_type.to_string(),
                message: format!("read stopped after {} documents: {err}", self.total),
            });
        }

        let failed = self.failed_ids().len();
        if failed > 0 {
            return Err(IndexError::Incomplete {
                doc_type: self.doc_type.to_string(),
                message: format!("{failed} of {} documents were not committed", self.total),
            });
        }

        Ok(self)
    }
}

/// Batching indexer for one document shape
pub struct BulkIndexer<D: Document> {
    index: String,
    query: Query,
    max_count: usize,
    source: Arc<dyn RecordSource>,
    backend: Arc<dyn SearchBackend>,
    id_of: IdFn<D>,
    enrich: Option<EnrichFn<D>>,
    _doc: PhantomData<fn() -> D>,
}

impl<D: Document> BulkIndexer<D> {
    pub fn new<F>(
        index: impl Into<String>,
        query: Query,
        source: Arc<dyn RecordSource>,
        backend: Arc<dyn SearchBackend>,
        id_of: F,
    ) -> Self
    where
        F: Fn(&D) -> String + Send + Sync + 'static,
    {
        Self {
            index: index.into(),
            query,
            max_count: 1000,
            source,
            backend,
            id_of: Box::new(id_of),
            enrich: None,
            _doc: PhantomData,
        }
    }

    /// Per-document mutation applied before submission
    pub fn with_enrich<F>(mut self, enrich: F) -> Self
    where
        F: Fn(&mut D) + Send + Sync + 'static,
    {
        self.enrich = Some(Box::new(enrich));
        self
    }

    /// Batch threshold; values below one are raised to one
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count.max(1);
        self
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Index every record the query yields.
    ///
    /// Only a failure to execute the query is returned as `Err`. Batch
    /// rejections and early cursor termination are recorded in the
    /// report.
    pub fn run(&self) -> Result<IndexReport> {
        let start = Instant::now();
        let kind = D::KIND;

        tracing::info!(
            doc_type = %kind,
            index = %self.index,
            max_count = self.max_count,
            "Starting bulk indexing"
        );

        let mut cursor = self.source.execute(&self.query).map_err(|e| {
            tracing::error!(doc_type = %kind, "Query execution failed: {}", e);
            e
        })?;

        let mut report = IndexReport::new(kind);
        let mut batch = BulkBatch::new();

        while let Some(row) = cursor.next() {
            let request = match self.prepare(row) {
                Ok(request) => request,
                Err(e) => {
                    report.cursor_error = Some(e);
                    break;
                }
            };

            batch.add(request);
            report.total += 1;

            if batch.len() >= self.max_count {
                self.flush(std::mem::take(&mut batch), &mut report);
            }
        }

        if report.cursor_error.is_none() {
            report.cursor_error = cursor.err();
        }
        if let Some(e) = &report.cursor_error {
            tracing::warn!(
                doc_type = %kind,
                total = report.total,
                "Cursor stopped early: {}",
                e
            );
        }

        if !batch.is_empty() {
            self.flush(batch, &mut report);
        }
        cursor.close();

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            doc_type = %kind,
            total = report.total,
            committed = report.committed(),
            batches = report.batches.len(),
            duration_ms = report.duration_ms,
            "Bulk indexing finished"
        );

        Ok(report)
    }

    fn prepare(&self, row: serde_json::Value) -> Result<IndexRequest> {
        let decode_err = |e: serde_json::Error| IndexError::Decode {
            doc_type: D::KIND.to_string(),
            message: e.to_string(),
        };

        let mut doc: D = serde_json::from_value(row).map_err(decode_err)?;
        if let Some(enrich) = &self.enrich {
            enrich(&mut doc);
        }

        Ok(IndexRequest {
            index: self.index.clone(),
            doc_type: D::KIND,
            id: (self.id_of)(&doc),
            document: serde_json::to_value(&doc).map_err(decode_err)?,
        })
    }

    fn flush(&self, batch: BulkBatch, report: &mut IndexReport) {
        let ids = batch.ids();

        match self.backend.submit(batch) {
            Ok(response) => {
                tracing::debug!(
                    doc_type = %D::KIND,
                    items = response.items,
                    took_ms = response.took_ms,
                    "Batch committed"
                );
                report.batches.push(BatchOutcome {
                    ids,
                    committed: true,
                    error: None,
                });
            }
            Err(e) => {
                tracing::error!(
                    doc_type = %D::KIND,
                    documents = ids.len(),
                    "Batch submission failed: {}",
                    e
                );
                report.batches.push(BatchOutcome {
                    ids,
                    committed: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }
}
