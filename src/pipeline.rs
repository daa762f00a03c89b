//! The scan pipeline orchestrator.
//!
//! Drives the whole run: for each table, page through sampled rows, submit a
//! scan per column group, poll every tracking ID to completion, then fetch
//! the table's findings. Execution is strictly sequential; all of a page's
//! scans reach a terminal state before the next page is fetched.

use crate::batch::{build_payload, split_columns};
use crate::config::RunConfig;
use crate::error::Result;
use crate::report::ReportDetail;
use crate::scan::{await_completion, fetch_report, PollPolicy, ScanService};
use crate::warehouse::WarehouseClient;
use tracing::{debug, info};

/// Orchestrates sampling, scanning, polling, and report collection.
pub struct Pipeline<'a> {
    warehouse: &'a dyn WarehouseClient,
    scanner: &'a dyn ScanService,
    config: &'a RunConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        warehouse: &'a dyn WarehouseClient,
        scanner: &'a dyn ScanService,
        config: &'a RunConfig,
    ) -> Self {
        Self {
            warehouse,
            scanner,
            config,
        }
    }

    /// Runs the pipeline over `tables` and returns the aggregate findings.
    ///
    /// Fails fast: the first error aborts the run and nothing is written.
    pub async fn run(&self, tables: &[String]) -> Result<Vec<ReportDetail>> {
        self.config.validate()?;

        let mut report = Vec::new();

        for table in tables {
            info!("Processing table: {table}");
            self.scan_table(table).await?;

            let details =
                fetch_report(self.scanner, &self.config.data_source_name, table).await?;
            info!("Collected {} report detail(s) for {table}", details.len());
            report.extend(details);
        }

        Ok(report)
    }

    /// Samples one table page by page, submitting and completing all scans.
    async fn scan_table(&self, table: &str) -> Result<()> {
        let policy = PollPolicy::new(self.config.poll_interval, self.config.max_poll_attempts);

        let mut offset = 0;
        while offset < self.config.num_rows {
            let limit = self.config.page_size.min(self.config.num_rows - offset);
            let page = self.warehouse.fetch_page(table, limit, offset).await?;

            if page.is_empty() {
                debug!("No rows at offset {offset} for {table}; done paging");
                break;
            }

            let mut tracking_ids = Vec::new();
            for group in split_columns(&page.columns, &page.rows, self.config.column_chunk_size)
            {
                let payload = build_payload(&self.config.data_source_name, table, &group);
                let tracking_id = self.scanner.submit_scan(&payload).await?;
                debug!(
                    "Submitted scan for {table} columns {:?}: tracking ID {tracking_id}",
                    group.columns
                );
                tracking_ids.push(tracking_id);
            }

            info!(
                "Submitted {} scan(s) for {table} at offset {offset}; awaiting completion",
                tracking_ids.len()
            );

            // Every tracking ID of this page reaches a terminal state before
            // the next page is fetched.
            for tracking_id in &tracking_ids {
                await_completion(self.scanner, tracking_id, &policy).await?;
            }

            if page.rows.len() < limit {
                debug!("Short page ({} rows) for {table}; done paging", page.rows.len());
                break;
            }
            offset += limit;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::scan::{MockScanService, ScanStatus, StatusPoll};
    use crate::warehouse::{MockWarehouse, Value};
    use std::time::Duration;

    fn test_config(num_rows: usize, page_size: usize) -> RunConfig {
        RunConfig {
            base_url: "https://scan.example.com/api".into(),
            data_source_name: "SF_DS".into(),
            num_rows,
            page_size,
            column_chunk_size: 5,
            poll_interval: Duration::from_millis(1),
            max_poll_attempts: 10,
        }
    }

    fn warehouse_with(num_rows: usize, num_columns: usize) -> MockWarehouse {
        let columns = (0..num_columns).map(|c| format!("col{c}")).collect();
        let rows = (0..num_rows)
            .map(|r| (0..num_columns).map(|c| Value::Int((r * 10 + c) as i64)).collect())
            .collect();
        MockWarehouse::new(columns, rows)
    }

    #[tokio::test]
    async fn test_run_submits_one_scan_per_column_group() {
        let warehouse = warehouse_with(3, 7);
        let scanner = MockScanService::new();
        let config = test_config(50, 50);
        let pipeline = Pipeline::new(&warehouse, &scanner, &config);

        pipeline.run(&["public.users".into()]).await.unwrap();

        // 7 columns at chunk size 5: groups of 5 and 2.
        let submitted = scanner.submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0].data_samples.len(), 5);
        assert_eq!(submitted[1].data_samples.len(), 2);
        assert_eq!(submitted[0].object_name, vec!["public", "users"]);
    }

    #[tokio::test]
    async fn test_run_stops_paging_on_short_page() {
        // 3-row table, page size 2, num_rows 10: pages of 2 and 1, then stop.
        let warehouse = warehouse_with(3, 2);
        let scanner = MockScanService::new();
        let config = test_config(10, 2);
        let pipeline = Pipeline::new(&warehouse, &scanner, &config);

        pipeline.run(&["t1".into()]).await.unwrap();

        assert_eq!(
            warehouse.fetches(),
            vec![("t1".to_string(), 2, 0), ("t1".to_string(), 2, 2)]
        );
    }

    #[tokio::test]
    async fn test_run_stops_paging_on_empty_page() {
        // Table size is an exact multiple of the page size, so the end shows
        // up as an empty page rather than a short one.
        let warehouse = warehouse_with(4, 2);
        let scanner = MockScanService::new();
        let config = test_config(10, 2);
        let pipeline = Pipeline::new(&warehouse, &scanner, &config);

        pipeline.run(&["t1".into()]).await.unwrap();

        assert_eq!(warehouse.fetches().len(), 3);
        assert_eq!(warehouse.fetches()[2], ("t1".to_string(), 2, 4));
    }

    #[tokio::test]
    async fn test_run_caps_last_page_at_num_rows() {
        let warehouse = warehouse_with(100, 2);
        let scanner = MockScanService::new();
        let config = test_config(5, 2);
        let pipeline = Pipeline::new(&warehouse, &scanner, &config);

        pipeline.run(&["t1".into()]).await.unwrap();

        // num_rows 5 at page size 2: limits 2, 2, 1.
        assert_eq!(
            warehouse.fetches(),
            vec![
                ("t1".to_string(), 2, 0),
                ("t1".to_string(), 2, 2),
                ("t1".to_string(), 1, 4)
            ]
        );
    }

    #[tokio::test]
    async fn test_submission_failure_aborts_run() {
        let warehouse = warehouse_with(3, 2);
        let scanner = MockScanService::new().with_submit_error("quota exceeded");
        let config = test_config(50, 50);
        let pipeline = Pipeline::new(&warehouse, &scanner, &config);

        let result = pipeline.run(&["t1".into()]).await;
        assert!(matches!(result, Err(ScanError::Submission(_))));
        assert_eq!(scanner.report_requests(), 0);
    }

    #[tokio::test]
    async fn test_transient_status_outage_does_not_abort_run() {
        let warehouse = warehouse_with(3, 2);
        let scanner = MockScanService::new().with_status_script(vec![
            StatusPoll::Unavailable("gateway error".into()),
            StatusPoll::Reported(ScanStatus::Success),
        ]);
        let config = test_config(50, 50);
        let pipeline = Pipeline::new(&warehouse, &scanner, &config);

        pipeline.run(&["t1".into()]).await.unwrap();
        assert_eq!(scanner.status_polls("trk-1"), 2);
    }

    #[tokio::test]
    async fn test_failed_scan_aborts_run() {
        let warehouse = warehouse_with(3, 2);
        let scanner =
            MockScanService::new().with_status_sequence(vec![ScanStatus::Error]);
        let config = test_config(50, 50);
        let pipeline = Pipeline::new(&warehouse, &scanner, &config);

        let result = pipeline.run(&["t1".into()]).await;
        assert!(matches!(result, Err(ScanError::ScanFailed(_))));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_any_fetch() {
        let warehouse = warehouse_with(3, 2);
        let scanner = MockScanService::new();
        let mut config = test_config(50, 50);
        config.num_rows = 0;
        let pipeline = Pipeline::new(&warehouse, &scanner, &config);

        let result = pipeline.run(&["t1".into()]).await;
        assert!(matches!(result, Err(ScanError::Config(_))));
        assert!(warehouse.fetches().is_empty());
    }
}
