//! Configuration management for warescan.
//!
//! Handles loading warehouse credentials from a JSON file, reading the target
//! table list, and validating the run parameters passed to the pipeline.

use crate::error::{Result, ScanError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Warehouse and scanning-service credentials.
///
/// Loaded once from a JSON file at startup and treated as immutable for the
/// rest of the run.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Warehouse account / host (optionally `host:port`).
    pub account: String,

    /// Warehouse user.
    pub user: String,

    /// Warehouse password.
    pub password: String,

    /// Warehouse (database) to run sample queries against.
    pub warehouse: String,

    /// Role to assume for sample queries.
    pub role: String,

    /// Bearer key for the scanning service.
    pub api_key: String,
}

impl Credentials {
    /// Loads credentials from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScanError::config(format!(
                "Failed to read credentials file {}: {e}",
                path.display()
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            ScanError::config(format!(
                "Invalid credentials file {}: {e}",
                path.display()
            ))
        })
    }

    /// Returns a display-safe string (no password or API key) for logging.
    pub fn display_string(&self) -> String {
        format!(
            "{} @ {} (warehouse: {}, role: {})",
            self.user, self.account, self.warehouse, self.role
        )
    }
}

// Manual Debug so secrets never end up in logs or panic output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("warehouse", &self.warehouse)
            .field("role", &self.role)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Reads the target table list: one qualified table name per line,
/// blank lines skipped, order preserved.
pub fn load_table_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ScanError::config(format!(
            "Failed to read table list {}: {e}",
            path.display()
        ))
    })?;

    let tables: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if tables.is_empty() {
        return Err(ScanError::config(format!(
            "Table list {} contains no table names",
            path.display()
        )));
    }

    Ok(tables)
}

/// Run parameters passed to the pipeline.
///
/// All limits are explicit here rather than baked in as constants, so tests
/// and multiple configurations can drive the same orchestrator.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Base URL of the scanning service API.
    pub base_url: String,

    /// Logical data source name reported to the scanning service.
    pub data_source_name: String,

    /// Total number of rows to sample per table.
    pub num_rows: usize,

    /// Rows fetched per warehouse query (LIMIT).
    pub page_size: usize,

    /// Columns per scan submission.
    pub column_chunk_size: usize,

    /// Delay between status polls.
    pub poll_interval: Duration,

    /// Maximum status polls per tracking ID before giving up.
    pub max_poll_attempts: u32,
}

impl RunConfig {
    /// Validates the run parameters.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ScanError::config("Base URL must not be empty"));
        }
        if self.num_rows == 0 {
            return Err(ScanError::config("num-rows must be at least 1"));
        }
        if self.page_size == 0 {
            return Err(ScanError::config("page-size must be at least 1"));
        }
        if self.column_chunk_size == 0 {
            return Err(ScanError::config("chunk-size must be at least 1"));
        }
        if self.max_poll_attempts == 0 {
            return Err(ScanError::config("max-poll-attempts must be at least 1"));
        }
        Ok(())
    }
}
