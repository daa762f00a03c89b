//! Error types for warescan.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for warescan operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Configuration errors (missing input files, malformed credentials, bad run parameters).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Warehouse connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Warehouse query errors (rejected identifiers, fetch failures).
    #[error("Query error: {0}")]
    Query(String),

    /// Scan submission errors (the service rejected a payload or was unreachable).
    #[error("Scan submission error: {0}")]
    Submission(String),

    /// A scan reached the ERROR state remotely, or never reached a terminal state.
    #[error("Scan failed: {0}")]
    ScanFailed(String),

    /// Report retrieval errors (unsuccessful response while paginating findings).
    #[error("Report error: {0}")]
    Report(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a scan submission error with the given message.
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    /// Creates a scan failure error with the given message.
    pub fn scan_failed(msg: impl Into<String>) -> Self {
        Self::ScanFailed(msg.into())
    }

    /// Creates a report error with the given message.
    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Submission(_) => "Submission Error",
            Self::ScanFailed(_) => "Scan Failed",
            Self::Report(_) => "Report Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using ScanError.
pub type Result<T> = std::result::Result<T, ScanError>;
