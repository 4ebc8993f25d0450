//! Content-addressable file layout.
//!
//! File bytes live under a content root, sharded by the second
//! `-`-separated segment of the file identifier:
//!
//! ```text
//! {root}/
//! ├── de/
//! │   └── fg/
//! │       ├── abc-defg-456             # original bytes
//! │       └── .conversion/
//! │           ├── abc-defg-456.jpg     # generated preview
//! │           └── abc-defg-456.pdf     # generated PDF rendition
//! └── upload/{upload-id}/              # in-flight uploads
//! ```
//!
//! Path resolution is pure string computation. Only [`ContentStore::locate`]
//! consults a [`ByteStore`] to pick between several roots.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::core::config::{ExtractionConfig, StorageConfig};
use crate::core::error::{IndexError, Result};
use crate::core::types::FileIdentity;

const CONVERSION_DIR: &str = ".conversion";
const PREVIEW_CONTENT_TYPE: &str = "image/jpeg";

/// Access to stored bytes
pub trait ByteStore: Send + Sync {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
    fn exists(&self, path: &Path) -> bool;
}

/// Byte store over the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalByteStore;

impl ByteStore for LocalByteStore {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// A resolved location and the content type to serve it with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub content_type: String,
}

/// Maps file identifiers to sharded paths under the content roots
#[derive(Debug, Clone)]
pub struct ContentStore {
    roots: Vec<PathBuf>,
    convertible: HashSet<String>,
}

impl ContentStore {
    /// Create a store. The first root is primary.
    pub fn new(roots: Vec<PathBuf>, convertible_media_types: Vec<String>) -> Result<Self> {
        if roots.is_empty() {
            return Err(IndexError::Config(
                "ContentStore needs at least one root".to_string(),
            ));
        }

        Ok(Self {
            roots,
            convertible: convertible_media_types.into_iter().collect(),
        })
    }

    pub fn from_config(storage: &StorageConfig, extraction: &ExtractionConfig) -> Result<Self> {
        Self::new(
            storage.mcdir.clone(),
            extraction.convertible_media_types.clone(),
        )
    }

    pub fn primary_root(&self) -> &Path {
        &self.roots[0]
    }

    /// Whether a media type is served through a JPEG preview
    pub fn is_convertible(&self, media_type: &str) -> bool {
        self.convertible.contains(media_type)
    }

    /// Resolve the path and content type to serve for a file.
    ///
    /// `uses_id`, when non-empty, replaces `id` for locating bytes.
    /// Convertible media types resolve to their preview unless
    /// `want_original` is set.
    pub fn resolve_path(
        &self,
        id: &str,
        media_type: &str,
        uses_id: &str,
        want_original: bool,
    ) -> Result<ResolvedPath> {
        let effective = if uses_id.is_empty() { id } else { uses_id };

        if self.is_convertible(media_type) && !want_original {
            return Ok(ResolvedPath {
                path: self.conversion_path(effective)?,
                content_type: PREVIEW_CONTENT_TYPE.to_string(),
            });
        }

        Ok(ResolvedPath {
            path: self.file_path(effective)?,
            content_type: media_type.to_string(),
        })
    }

    /// Shard directory for an identifier on the primary root
    pub fn file_dir(&self, id: &str) -> Result<PathBuf> {
        shard_dir(self.primary_root(), id)
    }

    /// Canonical path of the original bytes on the primary root
    pub fn file_path(&self, id: &str) -> Result<PathBuf> {
        Ok(self.file_dir(id)?.join(id))
    }

    /// Path of the generated JPEG preview
    pub fn conversion_path(&self, id: &str) -> Result<PathBuf> {
        Ok(self
            .file_dir(id)?
            .join(CONVERSION_DIR)
            .join(format!("{id}.jpg")))
    }

    /// Path of the generated PDF rendition
    pub fn conversion_pdf_path(&self, id: &str) -> Result<PathBuf> {
        Ok(self
            .file_dir(id)?
            .join(CONVERSION_DIR)
            .join(format!("{id}.pdf")))
    }

    /// Staging directory for an upload
    pub fn upload_dir(&self, upload_id: &str) -> PathBuf {
        self.primary_root().join("upload").join(upload_id)
    }

    /// Find the bytes of a file across all roots.
    ///
    /// Returns the first root holding the file, or the primary-root
    /// path when none does.
    pub fn locate(&self, identity: &FileIdentity, bytes: &dyn ByteStore) -> Result<PathBuf> {
        let id = identity.effective_id();
        for root in &self.roots {
            let candidate = shard_dir(root, id)?.join(id);
            if bytes.exists(&candidate) {
                return Ok(candidate);
            }
        }
        self.file_path(id)
    }
}

fn shard_dir(root: &Path, id: &str) -> Result<PathBuf> {
    let segment = id
        .split('-')
        .nth(1)
        .ok_or_else(|| IndexError::InvalidFileId(id.to_string()))?;

    match (segment.get(0..2), segment.get(2..4)) {
        (Some(first), Some(second)) => Ok(root.join(first).join(second)),
        _ => Err(IndexError::InvalidFileId(id.to_string())),
    }
}
