//! Indexer layer tests

mod test_batching;
mod test_entities;
mod test_scanner;
