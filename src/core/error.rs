//! Error types and error handling for the indexing service.
//!
//! This module defines the error types used throughout the
//! crate. Protocol-specific handling (HTTP status codes) lives in
//! the adapter modules.

use thiserror::Error;

/// Result type alias for indexing operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Main error type for the indexing service
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Cursor failed: {0}")]
    Cursor(String),

    #[error("Failed to decode {doc_type} record: {message}")]
    Decode { doc_type: String, message: String },

    #[error("Content extraction failed: {0}")]
    Extraction(String),

    #[error("Bulk submission failed: {0}")]
    BulkSubmit(String),

    #[error("Indexing of {doc_type} incomplete: {message}")]
    Incomplete { doc_type: String, message: String },

    #[error("No access")]
    NoAccess,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid file id: {0}")]
    InvalidFileId(String),

    #[error("Directory walk failed: {0}")]
    Walk(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl IndexError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(self, IndexError::FileNotFound(_))
    }

    /// Check if the caller lacked a valid API key
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, IndexError::NoAccess)
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            IndexError::InvalidFileId(_) | IndexError::Config(_) | IndexError::Query(_)
        )
    }
}
