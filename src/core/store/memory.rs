//! In-process record store.
//!
//! Tables are held as vectors of JSON objects and queries are
//! evaluated eagerly. A directory of `<table>.json` dumps (each a JSON
//! array of rows) can be loaded with [`MemoryStore::load_dir`].

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::query::{Key, Query};
use super::{Cursor, RecordSource, VecCursor};
use crate::core::error::{IndexError, Result};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style table registration
    pub fn with_table(mut self, name: &str, rows: Vec<Value>) -> Self {
        self.insert(name, rows);
        self
    }

    /// Append rows to a table, creating it if needed
    pub fn insert(&mut self, name: &str, rows: Vec<Value>) {
        self.tables.entry(name.to_string()).or_default().extend(rows);
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Load every `<table>.json` file in a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let rows: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path)?)?;
            tracing::debug!(table = %name, rows = rows.len(), "Loaded table dump");
            store.insert(name, rows);
        }

        Ok(store)
    }

    fn rows(&self, table: &str) -> Result<&[Value]> {
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| IndexError::Query(format!("Table `{table}` does not exist")))
    }

    fn eval(&self, query: &Query, row: Option<&Value>) -> Result<Vec<Value>> {
        match query {
            Query::Table(name) => Ok(self.rows(name)?.to_vec()),

            Query::GetAll { table, index, keys } => {
                let rows = self.rows(table)?;
                let mut out = Vec::new();
                for key in keys {
                    let wanted = resolve_key(key, row)?;
                    out.extend(
                        rows.iter()
                            .filter(|r| key_of(r.get(index)).as_deref() == Some(wanted.as_str()))
                            .cloned(),
                    );
                }
                Ok(out)
            }

            Query::Pluck { source, fields } => Ok(self
                .eval(source, row)?
                .into_iter()
                .map(|r| pluck(&r, fields))
                .collect()),

            Query::EqJoin {
                source,
                field,
                table,
                index,
            } => {
                let left_rows = self.eval(source, row)?;
                let right_rows = self.rows(table)?;
                let mut out = Vec::new();
                for left in left_rows {
                    let Some(key) = key_of(left.get(field)) else {
                        continue;
                    };
                    for right in right_rows {
                        if key_of(right.get(index)).as_deref() == Some(key.as_str()) {
                            let mut pair = Map::new();
                            pair.insert("left".to_string(), left.clone());
                            pair.insert("right".to_string(), right.clone());
                            out.push(Value::Object(pair));
                        }
                    }
                }
                Ok(out)
            }

            Query::Zip(source) => self
                .eval(source, row)?
                .into_iter()
                .map(zip)
                .collect(),

            Query::CopyField { source, from, to } => Ok(self
                .eval(source, row)?
                .into_iter()
                .map(|mut r| {
                    if let Some(value) = get_path(&r, from).cloned() {
                        set_path(&mut r, to, value);
                    }
                    r
                })
                .collect()),

            Query::Merge { source, fields } => {
                let mut out = Vec::new();
                for mut r in self.eval(source, row)? {
                    for field in fields {
                        let nested = self.eval(&field.query, Some(&r))?;
                        if let Value::Object(map) = &mut r {
                            map.insert(field.name.clone(), Value::Array(nested));
                        }
                    }
                    out.push(r);
                }
                Ok(out)
            }
        }
    }
}

impl RecordSource for MemoryStore {
    fn execute(&self, query: &Query) -> Result<Box<dyn Cursor>> {
        let rows = self.eval(query, None)?;
        Ok(Box::new(VecCursor::new(rows)))
    }
}

fn resolve_key(key: &Key, row: Option<&Value>) -> Result<String> {
    match key {
        Key::Value(v) => Ok(v.clone()),
        Key::Row(field) => row
            .and_then(|r| key_of(r.get(field)))
            .ok_or_else(|| IndexError::Query(format!("Row field `{field}` is not available"))),
    }
}

/// Comparable form of a key value
fn key_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn pluck(row: &Value, fields: &[String]) -> Value {
    let Value::Object(map) = row else {
        return row.clone();
    };
    Value::Object(
        fields
            .iter()
            .filter_map(|f| map.get(f).map(|v| (f.clone(), v.clone())))
            .collect(),
    )
}

fn zip(pair: Value) -> Result<Value> {
    let (Some(Value::Object(left)), Some(Value::Object(right))) =
        (pair.get("left"), pair.get("right"))
    else {
        return Err(IndexError::Query("zip requires left/right object pairs".to_string()));
    };

    let mut merged = left.clone();
    for (k, v) in right {
        merged.insert(k.clone(), v.clone());
    }
    Ok(Value::Object(merged))
}

fn get_path<'a>(row: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(row, |v, key| v.get(key))
}

fn set_path(row: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = row;
    for key in parents {
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if let Value::Object(map) = current {
        map.insert(last.clone(), value);
    }
}
