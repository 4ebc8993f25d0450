//! Core domain logic (protocol-agnostic)
//!
//! This module contains all business logic that is independent
//! of transport protocols (HTTP, CLI).
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Entity kinds and search documents
//! - **cas**: Content-addressable file layout
//! - **extract**: Text extraction from stored files
//! - **store**: Record store query model and cursor contract
//! - **search**: Bulk submission contract and Tantivy engine
//! - **indexer**: Batching engine, entity indexers, directory scanner
//! - **sync**: Change-driven reindexing
//! - **services**: Unified service container

pub mod cas;
pub mod config;
pub mod error;
pub mod extract;
pub mod indexer;
pub mod search;
pub mod services;
pub mod store;
pub mod sync;
pub mod types;

// Re-export key types for convenience
pub use config::Config;
pub use error::{IndexError, Result};
pub use services::Services;
