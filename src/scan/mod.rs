//! Scanning service integration for warescan.
//!
//! Provides the `ScanService` trait over the remote classification API, the
//! HTTP implementation, a scripted mock for tests, and the polling and
//! pagination loops that drive asynchronous scans to completion.

mod http;
mod mock;
mod types;

pub use http::HttpScanService;
pub use mock::MockScanService;
pub use types::{DataSample, ReportPage, ScanPayload, ScanStatus};

use crate::error::{Result, ScanError};
use crate::report::ReportDetail;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One observation from the status endpoint.
///
/// `Unavailable` covers answers that carry no usable status, such as an
/// unsuccessful response envelope; the poll loop treats those as transient
/// and keeps polling.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusPoll {
    /// The service reported a job status.
    Reported(ScanStatus),

    /// The service answered but produced no status; the message explains why.
    Unavailable(String),
}

/// Trait defining the interface to the scanning service.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ScanService: Send + Sync {
    /// Submits one scan payload and returns the tracking ID of the job.
    async fn submit_scan(&self, payload: &ScanPayload) -> Result<String>;

    /// Checks on a scan job. Transport failures are errors; an answer
    /// without a usable status is `StatusPoll::Unavailable`.
    async fn scan_status(&self, tracking_id: &str) -> Result<StatusPoll>;

    /// Fetches one page of the findings report for a table.
    async fn fetch_report_page(
        &self,
        data_source_name: &str,
        object_name: &[String],
        page_token: Option<&str>,
    ) -> Result<ReportPage>;
}

/// Bounds for the status poll loop.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay between consecutive status checks.
    pub interval: Duration,

    /// Maximum number of status checks before the scan is declared failed.
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// Polls a scan job until it reaches a terminal state.
///
/// Returns `Ok(())` on SUCCESS, `ScanError::ScanFailed` on ERROR, and
/// `ScanError::ScanFailed` as well when no terminal status arrives within
/// `policy.max_attempts` checks, so a remote outage cannot hang the run
/// forever. A check that yields no status at all counts as an attempt and
/// is retried like PENDING.
pub async fn await_completion(
    service: &dyn ScanService,
    tracking_id: &str,
    policy: &PollPolicy,
) -> Result<()> {
    for attempt in 1..=policy.max_attempts {
        let observed = service.scan_status(tracking_id).await?;
        debug!("Tracking ID {tracking_id}: {observed:?} (poll {attempt})");

        match observed {
            StatusPoll::Reported(ScanStatus::Success) => {
                info!("Tracking ID {tracking_id} completed successfully");
                return Ok(());
            }
            StatusPoll::Reported(ScanStatus::Error) => {
                return Err(ScanError::scan_failed(format!(
                    "scan {tracking_id} reported ERROR"
                )));
            }
            StatusPoll::Reported(ScanStatus::Pending) => {}
            StatusPoll::Unavailable(message) => {
                warn!("Status check for {tracking_id} returned no status: {message}");
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(ScanError::scan_failed(format!(
        "scan {tracking_id} did not reach a terminal status after {} polls",
        policy.max_attempts
    )))
}

/// Fetches the complete findings report for one table, following the
/// pagination cursor until the service stops returning one.
///
/// Always issues at least one request; details accumulate in request order.
pub async fn fetch_report(
    service: &dyn ScanService,
    data_source_name: &str,
    table: &str,
) -> Result<Vec<ReportDetail>> {
    let object_name: Vec<String> = table.split('.').map(String::from).collect();

    let mut details = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = service
            .fetch_report_page(data_source_name, &object_name, page_token.as_deref())
            .await?;

        debug!(
            "Report page for {table}: {} detail(s), next token: {}",
            page.details.len(),
            page.next_page_token.as_deref().unwrap_or("<none>")
        );

        details.extend(page.details);
        page_token = page.next_page_token;

        if page_token.is_none() {
            break;
        }
    }

    Ok(details)
}
