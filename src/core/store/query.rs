//! Graph-traversal query descriptions.
//!
//! Queries are built by the entity indexers and handed unchanged to
//! a [`RecordSource`](super::RecordSource). The indexing engine never
//! looks inside them.

use serde::{Deserialize, Serialize};

/// A lookup key: a literal value or a field of the enclosing row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Key {
    Value(String),
    Row(String),
}

/// Per-row sub-query whose results are collected into an array field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeField {
    pub name: String,
    pub query: Query,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Query {
    /// Every row of a table
    Table(String),
    /// Rows whose `index` field equals one of the keys
    GetAll {
        table: String,
        index: String,
        keys: Vec<Key>,
    },
    /// Keep only the named fields
    Pluck { source: Box<Query>, fields: Vec<String> },
    /// Join each row to `table` rows whose `index` equals the row's
    /// `field`, yielding `{"left": .., "right": ..}` pairs
    EqJoin {
        source: Box<Query>,
        field: String,
        table: String,
        index: String,
    },
    /// Flatten join pairs, right fields winning
    Zip(Box<Query>),
    /// Copy a nested value to another nested path
    CopyField {
        source: Box<Query>,
        from: Vec<String>,
        to: Vec<String>,
    },
    /// Attach sub-query results to each row
    Merge {
        source: Box<Query>,
        fields: Vec<MergeField>,
    },
}

impl Query {
    pub fn table(name: &str) -> Self {
        Query::Table(name.to_string())
    }

    /// Primary-key lookup
    pub fn get(table: &str, ids: &[String]) -> Self {
        Self::get_all(table, "id", ids.iter().cloned().map(Key::Value).collect())
    }

    pub fn get_all(table: &str, index: &str, keys: Vec<Key>) -> Self {
        Query::GetAll {
            table: table.to_string(),
            index: index.to_string(),
            keys,
        }
    }

    /// Lookup by secondary index with literal keys
    pub fn get_all_by(table: &str, index: &str, ids: &[String]) -> Self {
        Self::get_all(table, index, ids.iter().cloned().map(Key::Value).collect())
    }

    /// Lookup by secondary index keyed on a field of the enclosing row
    pub fn related(table: &str, index: &str, row_field: &str) -> Self {
        Self::get_all(table, index, vec![Key::Row(row_field.to_string())])
    }

    pub fn pluck(self, fields: &[&str]) -> Self {
        Query::Pluck {
            source: Box::new(self),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn eq_join(self, field: &str, table: &str, index: &str) -> Self {
        Query::EqJoin {
            source: Box::new(self),
            field: field.to_string(),
            table: table.to_string(),
            index: index.to_string(),
        }
    }

    /// Join on the primary key of `table`
    pub fn eq_join_pk(self, field: &str, table: &str) -> Self {
        self.eq_join(field, table, "id")
    }

    pub fn zip(self) -> Self {
        Query::Zip(Box::new(self))
    }

    pub fn copy_field(self, from: &[&str], to: &[&str]) -> Self {
        Query::CopyField {
            source: Box::new(self),
            from: from.iter().map(|s| s.to_string()).collect(),
            to: to.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn merge(self, fields: Vec<(&str, Query)>) -> Self {
        Query::Merge {
            source: Box::new(self),
            fields: fields
                .into_iter()
                .map(|(name, query)| MergeField {
                    name: name.to_string(),
                    query,
                })
                .collect(),
        }
    }
}
