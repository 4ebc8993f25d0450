//! Record store contract.
//!
//! The authoritative structured store is reached only through
//! [`RecordSource`]: execute a [`Query`] and iterate a [`Cursor`]
//! of JSON rows. [`MemoryStore`] is an in-process implementation
//! used by tests and by the CLI when indexing from a dump.

mod memory;
mod query;

pub use memory::MemoryStore;
pub use query::{Key, MergeField, Query};

use serde_json::Value;

use crate::core::error::{IndexError, Result};

/// Iterator-like handle over query results
pub trait Cursor: Send {
    /// Next row, or `None` when exhausted or failed
    fn next(&mut self) -> Option<Value>;

    /// Terminal error, if iteration stopped early
    fn err(&mut self) -> Option<IndexError>;

    fn close(&mut self) {}
}

/// Anything that can execute a query and hand back a cursor
pub trait RecordSource: Send + Sync {
    fn execute(&self, query: &Query) -> Result<Box<dyn Cursor>>;
}

/// Cursor over rows already in memory
pub struct VecCursor {
    rows: std::vec::IntoIter<Value>,
}

impl VecCursor {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl Cursor for VecCursor {
    fn next(&mut self) -> Option<Value> {
        self.rows.next()
    }

    fn err(&mut self) -> Option<IndexError> {
        None
    }
}
