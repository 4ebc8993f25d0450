//! Indexing pipeline.
//!
//! - **bulk**: Generic batching engine and run reports
//! - **entities**: Per-entity indexer configurations
//! - **scanner**: Concurrent bounded-worker directory walk
//! - **cancel**: Cancellation token shared by scanner threads

mod bulk;
mod cancel;
mod entities;
mod scanner;

pub use bulk::{BatchOutcome, BulkIndexer, IndexReport};
pub use cancel::CancelToken;
pub use entities::{EntityIndexers, Scope};
pub use scanner::{DirectoryScanner, Fid, FileEntry, Scan};
