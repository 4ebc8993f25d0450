//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for one
//! subcommand.

pub mod index;
pub mod scan;
pub mod search;
pub mod serve;
pub mod sync;

pub use index::IndexArgs;
pub use scan::ScanArgs;
pub use search::SearchArgs;
pub use serve::ServeArgs;
pub use sync::SyncArgs;
