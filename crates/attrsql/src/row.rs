//! Owned result rows.
//!
//! Drivers hand results back as [`Row`]s: ordered column/value pairs decoded
//! eagerly, detached from any backend handle. Select statements alias every
//! column to its attribute name, so row access is by attribute.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// One decoded result row: ordered column names with their values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    names: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from `(column, value)` pairs, preserving order.
    pub fn from_pairs<I, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, Value)>,
        N: Into<String>,
    {
        let (names, values) = pairs
            .into_iter()
            .map(|(n, v)| (n.into(), v))
            .unzip();
        Self { names, values }
    }

    pub(crate) fn from_pg(row: &tokio_postgres::Row) -> OrmResult<Self> {
        let mut names = Vec::with_capacity(row.len());
        let mut values = Vec::with_capacity(row.len());
        for idx in 0..row.len() {
            names.push(row.columns()[idx].name().to_string());
            values.push(Value::from_pg(row, idx)?);
        }
        Ok(Self { names, values })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names in result order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Iterate `(column, value)` pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Look up a value by column name. First match wins on duplicates.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == column)
            .map(|idx| &self.values[idx])
    }

    /// Like [`get`](Self::get) but failing with a decode error when absent.
    pub fn try_get(&self, column: &str) -> OrmResult<&Value> {
        self.get(column)
            .ok_or_else(|| OrmError::decode(column, "column not present in row"))
    }

    pub fn try_i64(&self, column: &str) -> OrmResult<i64> {
        self.try_get(column)?
            .as_i64()
            .ok_or_else(|| OrmError::decode(column, "not an integer"))
    }

    pub fn try_bool(&self, column: &str) -> OrmResult<bool> {
        self.try_get(column)?
            .as_bool()
            .ok_or_else(|| OrmError::decode(column, "not a boolean"))
    }

    pub fn try_text(&self, column: &str) -> OrmResult<&str> {
        self.try_get(column)?
            .as_str()
            .ok_or_else(|| OrmError::decode(column, "not text"))
    }
}
