//! Unified service container
//!
//! Provides shared access to all core services.

use std::sync::Arc;

use crate::core::cas::{ByteStore, ContentStore, LocalByteStore};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::extract::{CommandTool, ContentExtractor, TextTool};
use crate::core::indexer::{DirectoryScanner, EntityIndexers, IndexReport, Scope};
use crate::core::search::{SearchHit, TantivyBackend};
use crate::core::store::RecordSource;
use crate::core::sync::{ChangeEvent, ChangeSync};
use crate::core::types::EntityKind;

/// Unified services container
///
/// All adapters use this same struct for service access.
#[derive(Clone)]
pub struct Services {
    /// Application configuration
    pub config: Arc<Config>,

    /// Content-addressable layout of the file roots
    pub content: Arc<ContentStore>,

    /// Byte access for stored files
    pub bytes: Arc<dyn ByteStore>,

    /// Structured record store
    pub source: Arc<dyn RecordSource>,

    /// Search engine
    pub engine: Arc<TantivyBackend>,

    pub indexers: EntityIndexers,

    pub sync: ChangeSync,
}

impl Services {
    /// Create services from configuration, opening the on-disk index
    /// and shelling out to the configured extraction tool
    pub fn new(config: Config, source: Arc<dyn RecordSource>) -> Result<Self> {
        let engine = Arc::new(TantivyBackend::open_or_create(
            &config.storage.index_dir,
            config.indexing.writer_heap_bytes,
        )?);
        let tool = Arc::new(CommandTool::new(
            config.extraction.tool.clone(),
            config.extraction.tool_args.clone(),
        ));

        Self::with_parts(config, source, engine, tool)
    }

    /// Create services from explicit parts
    pub fn with_parts(
        config: Config,
        source: Arc<dyn RecordSource>,
        engine: Arc<TantivyBackend>,
        tool: Arc<dyn TextTool>,
    ) -> Result<Self> {
        let content = Arc::new(ContentStore::from_config(
            &config.storage,
            &config.extraction,
        )?);
        let bytes: Arc<dyn ByteStore> = Arc::new(LocalByteStore);

        let extractor = Arc::new(ContentExtractor::new(
            Arc::clone(&content),
            Arc::clone(&bytes),
            tool,
            config.extraction.max_content_bytes,
        ));

        let indexers = EntityIndexers::new(
            config.indexing.clone(),
            Arc::clone(&source),
            engine.clone(),
            extractor,
        );
        let sync = ChangeSync::new(Arc::clone(&source), indexers.clone());

        Ok(Self {
            config: Arc::new(config),
            content,
            bytes,
            source,
            engine,
            indexers,
            sync,
        })
    }

    /// Rebuild the whole index, one kind after another
    pub fn index_all(&self) -> Result<Vec<IndexReport>> {
        EntityKind::ALL
            .iter()
            .map(|kind| self.index(*kind, &Scope::All))
            .collect()
    }

    pub fn index(&self, kind: EntityKind, scope: &Scope) -> Result<IndexReport> {
        self.indexers.run(kind, scope)
    }

    /// Reindex whatever a record-store change affects
    pub fn apply_change(&self, event: &ChangeEvent) -> Result<Vec<IndexReport>> {
        self.sync.apply(event)
    }

    pub fn search(
        &self,
        query: &str,
        kind: Option<EntityKind>,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        self.engine.search(query, kind, limit)
    }

    pub fn scanner(&self) -> Result<DirectoryScanner> {
        DirectoryScanner::from_config(&self.config.scanner)
    }
}
