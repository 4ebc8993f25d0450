//! Core data types for the indexing service.
//!
//! Documents are the flattened, search-ready shape of each entity
//! kind. They are decoded fresh from the record store on every
//! indexing run and serialized into the search engine; they are
//! never written back to the store.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::IndexError;

/// The five entity kinds kept in the search index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[serde(rename = "datafile")]
    File,
    Sample,
    Process,
    Project,
    User,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Project,
        EntityKind::User,
        EntityKind::Process,
        EntityKind::Sample,
        EntityKind::File,
    ];

    /// Type label used in the search engine
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::File => "datafile",
            EntityKind::Sample => "sample",
            EntityKind::Process => "process",
            EntityKind::Project => "project",
            EntityKind::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "datafile" | "file" | "files" => Ok(EntityKind::File),
            "sample" | "samples" => Ok(EntityKind::Sample),
            "process" | "processes" => Ok(EntityKind::Process),
            "project" | "projects" => Ok(EntityKind::Project),
            "user" | "users" => Ok(EntityKind::User),
            other => Err(IndexError::Config(format!("Unknown entity kind: {other}"))),
        }
    }
}

/// A document that can be pushed to the search engine
pub trait Document: Serialize + DeserializeOwned + Send + 'static {
    const KIND: EntityKind;
}

/// Mime media type and its descriptions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub mime: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mime_description: String,
}

/// Reference to a tag attached to an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagRef {
    #[serde(rename(deserialize = "tag_id", serialize = "tag"))]
    pub tag_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub title: String,
}

/// Storage identity of a file's bytes
///
/// When `uses_id` is set the file shares the bytes of another
/// entry and the alias is authoritative for locating them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIdentity {
    pub id: String,
    pub uses_id: Option<String>,
}

impl FileIdentity {
    pub fn new(id: impl Into<String>, uses_id: impl Into<String>) -> Self {
        let uses_id = uses_id.into();
        Self {
            id: id.into(),
            uses_id: if uses_id.is_empty() { None } else { Some(uses_id) },
        }
    }

    /// Identifier that locates the bytes on disk
    pub fn effective_id(&self) -> &str {
        self.uses_id.as_deref().unwrap_or(&self.id)
    }
}

fn datafile_type() -> String {
    EntityKind::File.label().to_string()
}

fn sample_type() -> String {
    EntityKind::Sample.label().to_string()
}

fn process_type() -> String {
    EntityKind::Process.label().to_string()
}

fn project_type() -> String {
    EntityKind::Project.label().to_string()
}

fn user_type() -> String {
    EntityKind::User.label().to_string()
}

/// A data file with its directory, tags, notes and extracted text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDocument {
    pub id: String,
    #[serde(rename = "otype", default = "datafile_type")]
    pub doc_type: String,
    #[serde(default)]
    pub name: String,
    /// Directory path the file lives in
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "mediatype", default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub parent: String,
    #[serde(rename = "usesid", default)]
    pub uses_id: String,
    #[serde(default)]
    pub birthtime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mtime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub datadir_id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Extracted text; search-only, never present in the store
    #[serde(default)]
    pub contents: String,
}

impl FileDocument {
    pub fn identity(&self) -> FileIdentity {
        FileIdentity::new(self.id.clone(), self.uses_id.clone())
    }
}

impl Document for FileDocument {
    const KIND: EntityKind = EntityKind::File;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub name: String,
}

/// A file nested inside a sample document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleFile {
    pub datafile_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "mediatype", default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub size: i64,
    #[serde(rename = "usesid", default)]
    pub uses_id: String,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub contents: String,
}

impl SampleFile {
    pub fn identity(&self) -> FileIdentity {
        FileIdentity::new(self.datafile_id.clone(), self.uses_id.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleDocument {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "otype", default = "sample_type")]
    pub doc_type: String,
    pub sample_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub birthtime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mtime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub files: Vec<SampleFile>,
}

impl Document for SampleDocument {
    const KIND: EntityKind = EntityKind::Sample;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupProperty {
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDocument {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(rename = "_type", default = "process_type")]
    pub doc_type: String,
    pub process_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub process_type: String,
    #[serde(default)]
    pub does_transform: bool,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub what: String,
    #[serde(default)]
    pub why: String,
    #[serde(default)]
    pub birthtime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mtime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub setup: Vec<SetupProperty>,
}

impl Document for ProcessDocument {
    const KIND: EntityKind = EntityKind::Process;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub id: String,
    #[serde(rename = "_type", default = "project_type")]
    pub doc_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub datadir: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub birthtime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mtime: Option<DateTime<Utc>>,
}

impl Document for ProjectDocument {
    const KIND: EntityKind = EntityKind::Project;
}

/// User projection. Credentials in the store row are never decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: String,
    #[serde(rename = "_type", default = "user_type")]
    pub doc_type: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub affiliation: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub birthtime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mtime: Option<DateTime<Utc>>,
}

impl Document for UserDocument {
    const KIND: EntityKind = EntityKind::User;
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
