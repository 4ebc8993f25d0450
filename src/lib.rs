//! mcindex - search indexing for research data
//!
//! Keeps a Tantivy search index in step with a structured record store
//! of projects, samples, processes, users and data files, and serves
//! file bytes from a content-addressable store.
//!
//! # Architecture
//!
//! - **core**: Domain logic (protocol-agnostic)
//!   - config, error, types
//!   - store (record query model, in-memory store)
//!   - search (bulk submission, Tantivy engine)
//!   - indexer (batching engine, entity indexers, directory scanner)
//!   - cas, extract (file layout and text extraction)
//!   - sync, services
//!
//! - **http**: File-serving adapter (depends on core)
//!
//! - **cli**: clap adapter (depends on core and http)

// Core domain logic (protocol-agnostic)
pub mod core;

// HTTP file-serving adapter
pub mod http;

// Command-line adapter
pub mod cli;

pub use core::config::Config;
pub use core::error::{IndexError, Result};
pub use core::services::Services;
pub use core::types::{Document, EntityKind};
