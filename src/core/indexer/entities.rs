//! Per-entity indexer configurations.
//!
//! Each entity kind gets a [`BulkIndexer`] with its own record-store
//! query, id extractor, enrichment and batch threshold. Every kind can
//! be built for the full corpus or for a set of ids.

use std::sync::Arc;

use super::bulk::{BulkIndexer, IndexReport};
use crate::core::config::IndexingConfig;
use crate::core::error::Result;
use crate::core::extract::ContentExtractor;
use crate::core::search::SearchBackend;
use crate::core::store::{Query, RecordSource};
use crate::core::types::{
    Document, EntityKind, FileDocument, ProcessDocument, ProjectDocument, SampleDocument,
    UserDocument,
};

/// Which entities an indexing run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    One(String),
    Many(Vec<String>),
}

impl Scope {
    /// Scope for a caller-supplied id list; empty means everything
    pub fn from_ids(mut ids: Vec<String>) -> Self {
        match ids.len() {
            0 => Scope::All,
            1 => Scope::One(ids.remove(0)),
            _ => Scope::Many(ids),
        }
    }

    fn ids(&self) -> Option<Vec<String>> {
        match self {
            Scope::All => None,
            Scope::One(id) => Some(vec![id.clone()]),
            Scope::Many(ids) => Some(ids.clone()),
        }
    }
}

/// Builds entity indexers sharing one source, engine and extractor
#[derive(Clone)]
pub struct EntityIndexers {
    indexing: IndexingConfig,
    source: Arc<dyn RecordSource>,
    backend: Arc<dyn SearchBackend>,
    extractor: Arc<ContentExtractor>,
}

impl EntityIndexers {
    pub fn new(
        indexing: IndexingConfig,
        source: Arc<dyn RecordSource>,
        backend: Arc<dyn SearchBackend>,
        extractor: Arc<ContentExtractor>,
    ) -> Self {
        Self {
            indexing,
            source,
            backend,
            extractor,
        }
    }

    /// Run the indexer for one kind
    pub fn run(&self, kind: EntityKind, scope: &Scope) -> Result<IndexReport> {
        match kind {
            EntityKind::File => self.files(scope).run(),
            EntityKind::Sample => self.samples(scope).run(),
            EntityKind::Process => self.processes(scope).run(),
            EntityKind::Project => self.projects(scope).run(),
            EntityKind::User => self.users(scope).run(),
        }
    }

    fn build<D: Document, F>(&self, query: Query, id_of: F) -> BulkIndexer<D>
    where
        F: Fn(&D) -> String + Send + Sync + 'static,
    {
        BulkIndexer::new(
            self.indexing.index_name.clone(),
            query,
            Arc::clone(&self.source),
            Arc::clone(&self.backend),
            id_of,
        )
        .with_max_count(self.indexing.batch_size(D::KIND))
    }

    pub fn files(&self, scope: &Scope) -> BulkIndexer<FileDocument> {
        let membership = match scope.ids() {
            None => Query::table("projects")
                .pluck(&["id"])
                .eq_join("id", "project2datafile", "project_id")
                .zip(),
            Some(ids) => Query::get_all_by("project2datafile", "datafile_id", &ids),
        };

        let query = membership
            .eq_join("datafile_id", "datadir2datafile", "datafile_id")
            .zip()
            .eq_join_pk("datadir_id", "datadirs")
            .copy_field(&["right", "name"], &["right", "path"])
            .zip()
            .eq_join_pk("datafile_id", "datafiles")
            .zip()
            .merge(tags_and_notes());

        let extractor = Arc::clone(&self.extractor);
        self.build(query, |f: &FileDocument| f.id.clone())
            .with_enrich(move |f: &mut FileDocument| {
                f.contents =
                    extractor.extract_for(&f.identity(), &f.media_type.mime, &f.name, f.size);
            })
    }

    pub fn samples(&self, scope: &Scope) -> BulkIndexer<SampleDocument> {
        let membership = match scope.ids() {
            None => Query::table("projects")
                .pluck(&["id"])
                .eq_join("id", "project2sample", "project_id")
                .zip(),
            Some(ids) => Query::get_all_by("project2sample", "sample_id", &ids),
        };

        let query = membership
            .eq_join_pk("sample_id", "samples")
            .zip()
            .merge(properties_and_files());

        let extractor = Arc::clone(&self.extractor);
        self.build(query, |s: &SampleDocument| s.sample_id.clone())
            .with_enrich(move |s: &mut SampleDocument| {
                for file in &mut s.files {
                    file.contents = extractor.extract_for(
                        &file.identity(),
                        &file.media_type.mime,
                        &file.name,
                        file.size,
                    );
                }
            })
    }

    pub fn processes(&self, scope: &Scope) -> BulkIndexer<ProcessDocument> {
        let membership = match scope.ids() {
            None => Query::table("projects")
                .pluck(&["id"])
                .eq_join("id", "project2process", "project_id")
                .zip(),
            Some(ids) => Query::get_all_by("project2process", "process_id", &ids),
        };

        let query = membership
            .eq_join_pk("process_id", "processes")
            .zip()
            .merge(vec![(
                "setup",
                Query::related("process2setup", "process_id", "process_id")
                    .eq_join("setup_id", "setupproperties", "setup_id")
                    .zip(),
            )]);

        self.build(query, |p: &ProcessDocument| p.process_id.clone())
    }

    pub fn projects(&self, scope: &Scope) -> BulkIndexer<ProjectDocument> {
        let query = match scope.ids() {
            None => Query::table("projects"),
            Some(ids) => Query::get("projects", &ids),
        };
        self.build(query, |p: &ProjectDocument| p.id.clone())
    }

    pub fn users(&self, scope: &Scope) -> BulkIndexer<UserDocument> {
        let query = match scope.ids() {
            None => Query::table("users"),
            Some(ids) => Query::get("users", &ids),
        };
        self.build(query, |u: &UserDocument| u.id.clone())
    }
}

fn tags_and_notes() -> Vec<(&'static str, Query)> {
    vec![
        (
            "tags",
            Query::related("tag2item", "item_id", "id").pluck(&["tag_id"]),
        ),
        (
            "notes",
            Query::related("note2item", "item_id", "id")
                .eq_join_pk("note_id", "notes")
                .zip(),
        ),
    ]
}

fn properties_and_files() -> Vec<(&'static str, Query)> {
    vec![
        (
            "properties",
            Query::related("sample2propertyset", "sample_id", "sample_id")
                .eq_join("property_set_id", "propertyset2property", "property_set_id")
                .zip()
                .eq_join_pk("property_id", "properties")
                .zip()
                .pluck(&["attribute", "name"]),
        ),
        (
            "files",
            Query::related("sample2datafile", "sample_id", "sample_id")
                .eq_join_pk("datafile_id", "datafiles")
                .zip(),
        ),
    ]
}
