//! Warehouse abstraction layer for warescan.
//!
//! Provides a trait-based interface for sampling rows out of a SQL warehouse,
//! allowing different backends to be used interchangeably (and mocked in tests).

mod mock;
mod postgres;

pub use mock::MockWarehouse;
pub use postgres::PostgresWarehouse;

use crate::config::Credentials;
use crate::error::{Result, ScanError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A page of sampled rows fetched from one table at one offset.
#[derive(Debug, Clone, Default)]
pub struct RowPage {
    /// Column names, in table order.
    pub columns: Vec<String>,

    /// Row values, one `Vec<Value>` per row, aligned with `columns`.
    pub rows: Vec<Row>,
}

impl RowPage {
    /// Returns true if the page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A row of sampled data.
pub type Row = Vec<Value>;

/// Represents a single sampled value from the warehouse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text/string value.
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),
}

impl Value {
    /// Renders the value the way it appears in scan samples.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// Trait defining the interface for warehouse clients.
///
/// All operations are async and return Results with ScanError.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Fetches one page of rows from `table` using LIMIT/OFFSET.
    ///
    /// An offset past the end of the table yields an empty page, not an error.
    async fn fetch_page(&self, table: &str, limit: usize, offset: usize) -> Result<RowPage>;

    /// Closes the warehouse connection.
    async fn close(&self) -> Result<()>;
}

/// Connects to the warehouse described by `credentials`.
///
/// Central factory function for warehouse connections.
pub async fn connect(credentials: &Credentials) -> Result<Box<dyn WarehouseClient>> {
    let client = PostgresWarehouse::connect(credentials).await?;
    Ok(Box::new(client))
}

/// Validates a qualified table name before it is interpolated into SQL.
///
/// Each dot-separated part must start with a letter or underscore and contain
/// only letters, digits, underscores, and `$`. Anything else is rejected so an
/// untrusted table list can never smuggle SQL into the sample query.
pub fn validate_table_name(table: &str) -> Result<()> {
    let parts: Vec<&str> = table.split('.').collect();

    if parts.is_empty() || parts.iter().any(|p| p.is_empty()) {
        return Err(ScanError::query(format!(
            "invalid table identifier: '{table}'"
        )));
    }

    for part in parts {
        let mut chars = part.chars();
        let first_ok = chars
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        let rest_ok = part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

        if !first_ok || !rest_ok {
            return Err(ScanError::query(format!(
                "invalid table identifier: '{table}'"
            )));
        }
    }

    Ok(())
}
