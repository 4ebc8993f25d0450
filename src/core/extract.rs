//! Best-effort text extraction from stored file bytes.
//!
//! The extractor never fails: any error while locating, reading or
//! converting a file yields an empty string so that indexing of the
//! owning document continues.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::core::cas::{ByteStore, ContentStore};
use crate::core::error::{IndexError, Result};
use crate::core::types::FileIdentity;

/// Media types handed to the external extraction tool
static TOOL_MEDIA_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "application/msword",
        "application/pdf",
        "application/rtf",
        "application/vnd.ms-excel",
        "application/vnd.ms-office",
        "application/vnd.ms-powerpoint",
        "application/vnd.ms-powerpoint.presentation.macroEnabled.12",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/vnd.sealedmedia.softseal.pdf",
        "text/plain; charset=utf-8",
    ]
    .into_iter()
    .collect()
});

/// Whether a media type is handled by the external tool
pub fn is_tool_eligible(media_type: &str) -> bool {
    TOOL_MEDIA_TYPES.contains(media_type)
}

/// A program that turns a document into plain text
pub trait TextTool: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Runs an external command and captures its standard output
#[derive(Debug, Clone)]
pub struct CommandTool {
    program: String,
    args: Vec<String>,
}

impl CommandTool {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl TextTool for CommandTool {
    fn extract(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| IndexError::Extraction(format!("Failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(IndexError::Extraction(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Derives searchable text from stored files by media type
pub struct ContentExtractor {
    store: Arc<ContentStore>,
    bytes: Arc<dyn ByteStore>,
    tool: Arc<dyn TextTool>,
    max_bytes: u64,
}

impl ContentExtractor {
    pub fn new(
        store: Arc<ContentStore>,
        bytes: Arc<dyn ByteStore>,
        tool: Arc<dyn TextTool>,
        max_bytes: u64,
    ) -> Self {
        Self {
            store,
            bytes,
            tool,
            max_bytes,
        }
    }

    /// Extract text for a file, or an empty string.
    ///
    /// `id` is the identifier that locates the bytes (the alias when
    /// the file record has one). `size` is the size recorded for the
    /// file and is checked before anything is read.
    pub fn extract_text(&self, id: &str, media_type: &str, name: &str, size: i64) -> String {
        let result = match media_type {
            "text/csv" => self.first_data_line(id),
            "text/plain" if self.too_large(size) => return String::new(),
            "text/plain" => self.read_all(id),
            other if is_tool_eligible(other) => {
                if self.too_large(size) {
                    return String::new();
                }
                self.run_tool(id)
            }
            _ => return String::new(),
        };

        match result {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(
                    file_id = %id,
                    name = %name,
                    media_type = %media_type,
                    "No content extracted: {}",
                    e
                );
                String::new()
            }
        }
    }

    fn too_large(&self, size: i64) -> bool {
        size < 0 || size as u64 > self.max_bytes
    }

    fn source_path(&self, id: &str) -> Result<PathBuf> {
        self.store
            .locate(&FileIdentity::new(id, ""), self.bytes.as_ref())
    }

    /// First line that is non-empty and not a `#` comment, decoded lossily
    fn first_data_line(&self, id: &str) -> Result<String> {
        let path = self.source_path(id)?;
        let mut reader = BufReader::new(self.bytes.open(&path)?);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let mut line = buf.as_slice();
            if let Some(rest) = line.strip_suffix(b"\n") {
                line = rest.strip_suffix(b"\r").unwrap_or(rest);
            }
            if !line.is_empty() && !line.starts_with(b"#") {
                return Ok(String::from_utf8_lossy(line).into_owned());
            }
        }

        Err(IndexError::Extraction(format!("No data lines in {id}")))
    }

    fn read_all(&self, id: &str) -> Result<String> {
        let path = self.source_path(id)?;
        let mut buf = Vec::new();
        self.bytes
            .open(&path)?
            .take(self.max_bytes)
            .read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn run_tool(&self, id: &str) -> Result<String> {
        let path = self.source_path(id)?;
        if !self.bytes.exists(&path) {
            return Err(IndexError::FileNotFound(path.display().to_string()));
        }

        self.tool.extract(&path).map_err(|e| {
            tracing::warn!(file_id = %id, path = ?path, "Text extraction tool failed: {}", e);
            e
        })
    }

    /// Convenience wrapper taking a file identity
    pub fn extract_for(
        &self,
        identity: &FileIdentity,
        media_type: &str,
        name: &str,
        size: i64,
    ) -> String {
        self.extract_text(identity.effective_id(), media_type, name, size)
    }
}
