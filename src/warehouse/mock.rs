//! Mock warehouse client for testing.
//!
//! Serves LIMIT/OFFSET windows over an in-memory table and records every
//! fetch so tests can assert on paging behavior.

use super::{Row, RowPage, WarehouseClient};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// A mock warehouse client backed by fixed in-memory rows.
#[derive(Default)]
pub struct MockWarehouse {
    columns: Vec<String>,
    rows: Vec<Row>,
    fetches: Mutex<Vec<(String, usize, usize)>>,
}

impl MockWarehouse {
    /// Creates a mock with the given columns and rows, served to every table.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// Returns the (table, limit, offset) tuples of all fetches issued so far.
    pub fn fetches(&self) -> Vec<(String, usize, usize)> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl WarehouseClient for MockWarehouse {
    async fn fetch_page(&self, table: &str, limit: usize, offset: usize) -> Result<RowPage> {
        self.fetches
            .lock()
            .unwrap()
            .push((table.to_string(), limit, offset));

        let rows: Vec<Row> = self
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        let columns = if rows.is_empty() {
            Vec::new()
        } else {
            self.columns.clone()
        };

        Ok(RowPage { columns, rows })
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
