//! PostgreSQL warehouse client implementation.
//!
//! Provides the `PostgresWarehouse` struct that implements the `WarehouseClient`
//! trait using sqlx. Credential fields map onto connection options: `account`
//! is the host (optionally `host:port`), `warehouse` is the database, and
//! `role` is applied to every pooled connection with `SET ROLE`.

use crate::config::Credentials;
use crate::error::{Result, ScanError};
use crate::warehouse::{validate_table_name, Row, RowPage, Value, WarehouseClient};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo};
use std::time::Duration;
use tracing::debug;

/// Timeout for acquiring a pooled connection.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL warehouse client.
#[derive(Debug)]
pub struct PostgresWarehouse {
    pool: PgPool,
}

impl PostgresWarehouse {
    /// Connects to the warehouse described by `credentials`.
    ///
    /// Fails with `ScanError::Connection` on authentication or network failure.
    pub async fn connect(credentials: &Credentials) -> Result<Self> {
        // The role is interpolated into SET ROLE, so it gets the same
        // identifier screening as table names.
        validate_table_name(&credentials.role)
            .map_err(|_| ScanError::connection(format!("Invalid role: '{}'", credentials.role)))?;

        let (host, port) = parse_account(&credentials.account)?;

        let mut options = PgConnectOptions::new()
            .host(&host)
            .username(&credentials.user)
            .password(&credentials.password)
            .database(&credentials.warehouse);
        if let Some(port) = port {
            options = options.port(port);
        }

        let set_role = format!("SET ROLE {}", credentials.role);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .after_connect(move |conn, _meta| {
                let set_role = set_role.clone();
                Box::pin(async move {
                    sqlx::query(&set_role).execute(conn).await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await
            .map_err(|e| map_connection_error(e, credentials))?;

        debug!("Connected to warehouse {}", credentials.display_string());
        Ok(Self { pool })
    }

    /// Creates a client from an existing connection pool.
    ///
    /// This is primarily useful for testing.
    #[allow(dead_code)]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WarehouseClient for PostgresWarehouse {
    async fn fetch_page(&self, table: &str, limit: usize, offset: usize) -> Result<RowPage> {
        validate_table_name(table)?;

        // Identifier has been validated above; LIMIT/OFFSET are bound.
        let sql = format!("SELECT * FROM {table} LIMIT $1 OFFSET $2");
        debug!("Fetching page: table={table} limit={limit} offset={offset}");

        let result: Vec<PgRow> = sqlx::query(&sql)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ScanError::query(format!("Failed to fetch from {table}: {e}")))?;

        // An offset past the end of the table yields an empty page. Column
        // metadata only matters when there are rows to sample, so the empty
        // page carries no columns either.
        let columns: Vec<String> = result
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows: Vec<Row> = result.iter().map(convert_row).collect();

        Ok(RowPage { columns, rows })
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Splits an account string into host and optional port.
fn parse_account(account: &str) -> Result<(String, Option<u16>)> {
    match account.split_once(':') {
        None => Ok((account.to_string(), None)),
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|_| {
                ScanError::connection(format!("Invalid port in account '{account}'"))
            })?;
            Ok((host.to_string(), Some(port)))
        }
    }
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // Everything else is sampled as text.
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, credentials: &Credentials) -> ScanError {
    let account = &credentials.account;
    let user = &credentials.user;
    let warehouse = &credentials.warehouse;

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ScanError::connection(format!(
            "Cannot connect to {account}. Check that the warehouse is reachable."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        ScanError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        ScanError::connection(format!("Warehouse '{warehouse}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ScanError::connection(format!(
            "Connection to {account} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ScanError::connection(error.to_string())
    }
}
