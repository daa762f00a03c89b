//! warescan - samples warehouse tables, scans them for PI, and reports.
//!
//! This library exposes the core modules for use in integration tests.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod scan;
pub mod warehouse;
