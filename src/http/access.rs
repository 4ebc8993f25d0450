//! File access checks for the serving boundary.
//!
//! Handlers depend on the [`FileAccess`] capability only, so tests can
//! substitute a double for the record-store backed implementation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::core::error::{IndexError, Result};
use crate::core::store::{Query, RecordSource};
use crate::core::types::MediaType;

/// The parts of a file record needed to serve its bytes
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "mediatype", default)]
    pub media_type: MediaType,
    #[serde(rename = "usesid", default)]
    pub uses_id: String,
    #[serde(default)]
    pub size: i64,
}

/// Look up a file on behalf of an API key holder
#[async_trait]
pub trait FileAccess: Send + Sync {
    async fn get_file(&self, apikey: &str, file_id: &str) -> Result<FileRecord>;
}

/// Validates API keys against the `users` table and loads the file
/// from `datafiles`
#[derive(Clone)]
pub struct StoreFileAccess {
    source: Arc<dyn RecordSource>,
}

impl StoreFileAccess {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    fn lookup(source: &dyn RecordSource, apikey: &str, file_id: &str) -> Result<FileRecord> {
        if apikey.is_empty() {
            return Err(IndexError::NoAccess);
        }

        let user = first(source, &Query::get_all_by("users", "apikey", &[apikey.to_string()]))?;
        if user.is_none() {
            return Err(IndexError::NoAccess);
        }

        let row = first(source, &Query::get("datafiles", &[file_id.to_string()]))?
            .ok_or_else(|| IndexError::FileNotFound(file_id.to_string()))?;

        Ok(serde_json::from_value(row)?)
    }
}

#[async_trait]
impl FileAccess for StoreFileAccess {
    async fn get_file(&self, apikey: &str, file_id: &str) -> Result<FileRecord> {
        let source = Arc::clone(&self.source);
        let apikey = apikey.to_string();
        let file_id = file_id.to_string();

        tokio::task::spawn_blocking(move || Self::lookup(source.as_ref(), &apikey, &file_id))
            .await
            .map_err(|e| IndexError::Storage(format!("File lookup task failed: {e}")))?
    }
}

fn first(source: &dyn RecordSource, query: &Query) -> Result<Option<Value>> {
    let mut cursor = source.execute(query)?;
    let row = cursor.next();
    let err = cursor.err();
    cursor.close();

    match err {
        Some(e) if row.is_none() => Err(e),
        _ => Ok(row),
    }
}
