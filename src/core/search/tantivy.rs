//! Tantivy-backed search engine.
//!
//! Every document is stored as its JSON source plus a flattened
//! `text` field holding all string leaves for BM25 search. The
//! `uid` field (`{index}/{type}/{id}`) makes submission an upsert.

use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use tantivy::collector::{Count, TopDocs};
use tantivy::directory::MmapDirectory;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema, Value, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use super::{document_uid, BulkBatch, BulkResponse, SearchBackend, SearchHit};
use crate::core::error::{IndexError, Result};
use crate::core::types::EntityKind;

/// Create the engine schema
///
/// Fields:
/// - uid: `{index}/{type}/{id}` upsert key (STRING | STORED)
/// - index: Logical index name (STRING | STORED)
/// - doc_type: Entity type label (STRING | STORED)
/// - doc_id: Document id (STRING | STORED)
/// - text: Flattened searchable text (TEXT)
/// - source: Original JSON document (STORED)
pub fn create_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_text_field("uid", STRING | STORED);
    builder.add_text_field("index", STRING | STORED);
    builder.add_text_field("doc_type", STRING | STORED);
    builder.add_text_field("doc_id", STRING | STORED);
    builder.add_text_field("text", TEXT);
    builder.add_text_field("source", STORED);

    builder.build()
}

#[derive(Debug, Clone, Copy)]
struct Fields {
    uid: Field,
    index: Field,
    doc_type: Field,
    doc_id: Field,
    text: Field,
    source: Field,
}

impl Fields {
    fn resolve(schema: &Schema) -> Result<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| IndexError::Storage(format!("Missing {name} field: {e}")))
        };

        Ok(Self {
            uid: field("uid")?,
            index: field("index")?,
            doc_type: field("doc_type")?,
            doc_id: field("doc_id")?,
            text: field("text")?,
            source: field("source")?,
        })
    }
}

/// Readers open freely; the writer (and the directory lock it holds)
/// is only taken by the first `submit`.
pub struct TantivyBackend {
    index: Index,
    fields: Fields,
    writer: Mutex<Option<IndexWriter>>,
    writer_heap_bytes: usize,
    reader: IndexReader,
}

impl std::fmt::Debug for TantivyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyBackend")
            .field("schema", &"<schema>")
            .finish()
    }
}

impl TantivyBackend {
    /// Open the index in `index_dir`, creating it when absent
    pub fn open_or_create(index_dir: &Path, writer_heap_bytes: usize) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;

        let directory = MmapDirectory::open(index_dir)
            .map_err(|e| IndexError::Storage(format!("Failed to open index directory: {e}")))?;
        let index = Index::open_or_create(directory, create_schema())
            .map_err(|e| IndexError::Storage(format!("Failed to open index: {e}")))?;

        Self::from_index(index, writer_heap_bytes)
    }

    /// Volatile index for tests and dry runs
    pub fn in_memory(writer_heap_bytes: usize) -> Result<Self> {
        Self::from_index(Index::create_in_ram(create_schema()), writer_heap_bytes)
    }

    fn from_index(index: Index, writer_heap_bytes: usize) -> Result<Self> {
        let fields = Fields::resolve(&index.schema())?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| IndexError::Storage(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            index,
            fields,
            writer: Mutex::new(None),
            writer_heap_bytes,
            reader,
        })
    }

    /// Pick up commits made since the last reload, including other processes'
    pub fn refresh(&self) -> Result<()> {
        self.reader
            .reload()
            .map_err(|e| IndexError::Storage(format!("Failed to reload reader: {e}")))
    }

    /// Total number of live documents
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Number of documents stored under a key (0 or 1)
    pub fn count(&self, index: &str, doc_type: EntityKind, id: &str) -> Result<usize> {
        let query = self.uid_query(index, doc_type, id);
        self.reader
            .searcher()
            .search(&query, &Count)
            .map_err(|e| IndexError::Storage(format!("Count failed: {e}")))
    }

    /// Stored JSON source of a document
    pub fn get(&self, index: &str, doc_type: EntityKind, id: &str) -> Result<Option<JsonValue>> {
        let searcher = self.reader.searcher();
        let query = self.uid_query(index, doc_type, id);

        let top = searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(|e| IndexError::Storage(format!("Lookup failed: {e}")))?;

        match top.first() {
            Some((_, address)) => {
                let doc: TantivyDocument = searcher
                    .doc(*address)
                    .map_err(|e| IndexError::Storage(format!("Failed to retrieve document: {e}")))?;
                Ok(Some(self.source_of(&doc)?))
            }
            None => Ok(None),
        }
    }

    /// BM25 search over the flattened text, optionally restricted to one type
    pub fn search(
        &self,
        query_str: &str,
        doc_type: Option<EntityKind>,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        if query_str.trim().is_empty() {
            return Err(IndexError::Query("Query cannot be empty".to_string()));
        }

        let parser = QueryParser::for_index(&self.index, vec![self.fields.text]);
        let parsed = parser
            .parse_query(query_str)
            .map_err(|e| IndexError::Query(format!("Failed to parse query: {e}")))?;

        let query: Box<dyn Query> = match doc_type {
            Some(kind) => Box::new(BooleanQuery::new(vec![
                (Occur::Must, parsed),
                (
                    Occur::Must,
                    Box::new(TermQuery::new(
                        Term::from_field_text(self.fields.doc_type, kind.label()),
                        IndexRecordOption::Basic,
                    )),
                ),
            ])),
            None => parsed,
        };

        self.refresh()?;
        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| IndexError::Storage(format!("Search failed: {e}")))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| IndexError::Storage(format!("Failed to retrieve document: {e}")))?;

            hits.push(SearchHit {
                score,
                doc_type: Self::extract_text(&doc, self.fields.doc_type),
                id: Self::extract_text(&doc, self.fields.doc_id),
                document: self.source_of(&doc)?,
            });
        }

        Ok(hits)
    }

    fn uid_query(&self, index: &str, doc_type: EntityKind, id: &str) -> TermQuery {
        TermQuery::new(
            Term::from_field_text(self.fields.uid, &document_uid(index, doc_type, id)),
            IndexRecordOption::Basic,
        )
    }

    fn source_of(&self, doc: &TantivyDocument) -> Result<JsonValue> {
        Ok(serde_json::from_str(&Self::extract_text(doc, self.fields.source))?)
    }

    fn extract_text(doc: &TantivyDocument, field: Field) -> String {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    }
}

impl TantivyBackend {
    fn open_writer(&self) -> Result<IndexWriter> {
        self.index
            .writer(self.writer_heap_bytes)
            .map_err(|e| IndexError::BulkSubmit(format!("Failed to create writer: {e}")))
    }

    /// Queue the delete + add pairs of a batch without committing
    fn stage(&self, writer: &mut IndexWriter, batch: &BulkBatch) -> Result<()> {
        let f = self.fields;

        for request in batch.requests() {
            let uid = request.uid();
            let source = serde_json::to_string(&request.document)?;

            writer.delete_term(Term::from_field_text(f.uid, &uid));
            writer
                .add_document(doc!(
                    f.uid => uid.as_str(),
                    f.index => request.index.as_str(),
                    f.doc_type => request.doc_type.label(),
                    f.doc_id => request.id.as_str(),
                    f.text => flatten_text(&request.document),
                    f.source => source,
                ))
                .map_err(|e| IndexError::BulkSubmit(format!("Failed to add document: {e}")))?;
        }

        Ok(())
    }

    /// Drop everything queued since the last commit
    fn discard(writer: &mut IndexWriter) {
        if let Err(e) = writer.rollback() {
            tracing::warn!("Failed to roll back index writer: {e}");
        }
    }
}

impl SearchBackend for TantivyBackend {
    fn submit(&self, batch: BulkBatch) -> Result<BulkResponse> {
        let start = Instant::now();

        let mut guard = self
            .writer
            .lock()
            .map_err(|_| IndexError::BulkSubmit("Index writer lock poisoned".to_string()))?;
        if guard.is_none() {
            *guard = Some(self.open_writer()?);
        }
        let Some(writer) = guard.as_mut() else {
            return Err(IndexError::BulkSubmit("Index writer unavailable".to_string()));
        };

        let written = self.stage(writer, &batch).and_then(|()| {
            writer
                .commit()
                .map(|_| ())
                .map_err(|e| IndexError::BulkSubmit(format!("Failed to commit: {e}")))
        });
        if let Err(e) = written {
            Self::discard(writer);
            return Err(e);
        }
        drop(guard);

        self.refresh()?;

        Ok(BulkResponse {
            items: batch.len(),
            took_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// All string and number leaves of a JSON value, newline separated
fn flatten_text(value: &JsonValue) -> String {
    fn walk(value: &JsonValue, out: &mut Vec<String>) {
        match value {
            JsonValue::String(s) if !s.is_empty() => out.push(s.clone()),
            JsonValue::Number(n) => out.push(n.to_string()),
            JsonValue::Array(items) => items.iter().for_each(|v| walk(v, out)),
            JsonValue::Object(map) => map.values().for_each(|v| walk(v, out)),
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(value, &mut out);
    out.join("\n")
}
