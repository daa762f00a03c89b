//! Command-line argument parsing for warescan.
//!
//! Uses clap to parse run parameters; secrets stay in the credentials file,
//! only paths and limits are taken from the command line.

use crate::config::RunConfig;
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Samples warehouse tables, scans them for PI, and writes an Excel report.
#[derive(Parser, Debug)]
#[command(name = "warescan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the scanning service API
    #[arg(long, value_name = "URL", env = "WARESCAN_BASE_URL")]
    pub base_url: String,

    /// Path to the JSON credentials file
    #[arg(long, value_name = "PATH", default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Path to the table list (one qualified table name per line)
    #[arg(long, value_name = "PATH", default_value = "tables.txt")]
    pub tables: PathBuf,

    /// Output path for the .xlsx report
    #[arg(short = 'o', long, value_name = "PATH", default_value = "data_scan_report.xlsx")]
    pub output: PathBuf,

    /// Data source name the findings are filed under
    #[arg(long, value_name = "NAME", default_value = "SF_DS")]
    pub data_source: String,

    /// Total number of rows to sample per table
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub num_rows: usize,

    /// Rows fetched per warehouse query
    #[arg(long, value_name = "N", default_value_t = 50)]
    pub page_size: usize,

    /// Columns per scan submission
    #[arg(long, value_name = "N", default_value_t = 5)]
    pub chunk_size: usize,

    /// Seconds between scan status polls
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub poll_interval_secs: u64,

    /// Maximum status polls per scan before giving up
    #[arg(long, value_name = "N", default_value_t = 120)]
    pub max_poll_attempts: u32,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds and validates the run configuration from the parsed arguments.
    pub fn to_run_config(&self) -> Result<RunConfig> {
        let config = RunConfig {
            base_url: self.base_url.clone(),
            data_source_name: self.data_source.clone(),
            num_rows: self.num_rows,
            page_size: self.page_size,
            column_chunk_size: self.chunk_size,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            max_poll_attempts: self.max_poll_attempts,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_defaults() {
        let cli = parse_args(&["warescan", "--base-url", "https://scan.example.com/api"]);

        assert_eq!(cli.credentials, PathBuf::from("credentials.json"));
        assert_eq!(cli.tables, PathBuf::from("tables.txt"));
        assert_eq!(cli.output, PathBuf::from("data_scan_report.xlsx"));
        assert_eq!(cli.data_source, "SF_DS");
        assert_eq!(cli.num_rows, 100);
        assert_eq!(cli.page_size, 50);
        assert_eq!(cli.chunk_size, 5);
        assert_eq!(cli.poll_interval_secs, 5);
        assert_eq!(cli.max_poll_attempts, 120);
    }

    #[test]
    fn test_explicit_arguments() {
        let cli = parse_args(&[
            "warescan",
            "--base-url",
            "https://scan.example.com/api",
            "--credentials",
            "/etc/warescan/creds.json",
            "--tables",
            "prod_tables.txt",
            "-o",
            "out.xlsx",
            "--num-rows",
            "500",
            "--page-size",
            "100",
            "--chunk-size",
            "3",
        ]);

        assert_eq!(cli.credentials, PathBuf::from("/etc/warescan/creds.json"));
        assert_eq!(cli.tables, PathBuf::from("prod_tables.txt"));
        assert_eq!(cli.output, PathBuf::from("out.xlsx"));
        assert_eq!(cli.num_rows, 500);
        assert_eq!(cli.page_size, 100);
        assert_eq!(cli.chunk_size, 3);
    }

    #[test]
    fn test_to_run_config() {
        let cli = parse_args(&[
            "warescan",
            "--base-url",
            "https://scan.example.com/api",
            "--poll-interval-secs",
            "2",
        ]);

        let config = cli.to_run_config().unwrap();
        assert_eq!(config.base_url, "https://scan.example.com/api");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_poll_attempts, 120);
    }

    #[test]
    fn test_to_run_config_rejects_zero_page_size() {
        let cli = parse_args(&[
            "warescan",
            "--base-url",
            "https://scan.example.com/api",
            "--page-size",
            "0",
        ]);

        assert!(cli.to_run_config().is_err());
    }

    #[test]
    fn test_base_url_is_required() {
        // Without the flag (and with no env fallback set) parsing fails.
        let result = Cli::try_parse_from(["warescan"]);
        if std::env::var("WARESCAN_BASE_URL").is_err() {
            assert!(result.is_err());
        }
    }
}
