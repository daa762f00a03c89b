//! Mock scanning service for testing.
//!
//! Tracks submissions, serves scripted status sequences, and pages out
//! pre-registered report details without touching the network.

use super::types::{ReportPage, ScanPayload, ScanStatus};
use super::{ScanService, StatusPoll};
use crate::error::{Result, ScanError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Per-job poll state: the scripted observations and how many polls have
/// happened.
struct JobState {
    script: Vec<StatusPoll>,
    polls: u32,
}

/// Mock scan service with scripted responses.
///
/// Each submission is assigned a tracking ID `trk-N` and the configured
/// status script; once the script is exhausted its last entry repeats,
/// so a `[Pending]` script simulates a job that never completes.
#[derive(Default)]
pub struct MockScanService {
    status_template: Mutex<Vec<StatusPoll>>,
    submit_error: Mutex<Option<String>>,
    submitted: Mutex<Vec<ScanPayload>>,
    jobs: Mutex<HashMap<String, JobState>>,
    report_pages: Mutex<HashMap<String, Vec<ReportPage>>>,
    report_cursor: Mutex<HashMap<String, usize>>,
    report_requests: Mutex<usize>,
}

impl MockScanService {
    /// Creates a mock whose scans succeed on the first poll.
    pub fn new() -> Self {
        Self {
            status_template: Mutex::new(vec![StatusPoll::Reported(ScanStatus::Success)]),
            ..Default::default()
        }
    }

    /// Sets the status sequence assigned to every subsequent submission.
    pub fn with_status_sequence(self, statuses: Vec<ScanStatus>) -> Self {
        self.with_status_script(statuses.into_iter().map(StatusPoll::Reported).collect())
    }

    /// Sets the full poll script, including checks that yield no status.
    pub fn with_status_script(self, script: Vec<StatusPoll>) -> Self {
        *self.status_template.lock().unwrap() = script;
        self
    }

    /// Makes every submission fail with the given remote message.
    pub fn with_submit_error(self, message: impl Into<String>) -> Self {
        *self.submit_error.lock().unwrap() = Some(message.into());
        self
    }

    /// Registers the report pages served for a qualified table name.
    pub fn with_report_pages(self, table: &str, pages: Vec<ReportPage>) -> Self {
        self.report_pages
            .lock()
            .unwrap()
            .insert(table.to_string(), pages);
        self
    }

    /// Returns all payloads submitted so far, in submission order.
    pub fn submitted(&self) -> Vec<ScanPayload> {
        self.submitted.lock().unwrap().clone()
    }

    /// Returns how many times the given tracking ID has been polled.
    pub fn status_polls(&self, tracking_id: &str) -> u32 {
        self.jobs
            .lock()
            .unwrap()
            .get(tracking_id)
            .map(|job| job.polls)
            .unwrap_or(0)
    }

    /// Returns the total number of report page requests.
    pub fn report_requests(&self) -> usize {
        *self.report_requests.lock().unwrap()
    }
}

#[async_trait]
impl ScanService for MockScanService {
    async fn submit_scan(&self, payload: &ScanPayload) -> Result<String> {
        if let Some(message) = self.submit_error.lock().unwrap().clone() {
            return Err(ScanError::submission(message));
        }

        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(payload.clone());
        let tracking_id = format!("trk-{}", submitted.len());

        self.jobs.lock().unwrap().insert(
            tracking_id.clone(),
            JobState {
                script: self.status_template.lock().unwrap().clone(),
                polls: 0,
            },
        );

        Ok(tracking_id)
    }

    async fn scan_status(&self, tracking_id: &str) -> Result<StatusPoll> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(tracking_id)
            .ok_or_else(|| ScanError::scan_failed(format!("unknown tracking ID {tracking_id}")))?;

        let index = (job.polls as usize).min(job.script.len().saturating_sub(1));
        job.polls += 1;
        Ok(job
            .script
            .get(index)
            .cloned()
            .unwrap_or_else(|| StatusPoll::Unavailable("no scripted status".into())))
    }

    async fn fetch_report_page(
        &self,
        _data_source_name: &str,
        object_name: &[String],
        _page_token: Option<&str>,
    ) -> Result<ReportPage> {
        *self.report_requests.lock().unwrap() += 1;

        let key = object_name.join(".");
        let pages = self.report_pages.lock().unwrap();
        let Some(pages) = pages.get(&key) else {
            return Ok(ReportPage::default());
        };

        let mut cursors = self.report_cursor.lock().unwrap();
        let cursor = cursors.entry(key).or_insert(0);
        // Past the end of the script (or an empty one) the last page
        // repeats, falling back to an empty terminal page.
        let page = pages
            .get(*cursor)
            .or_else(|| pages.last())
            .cloned()
            .unwrap_or_default();
        *cursor += 1;

        Ok(page)
    }
}

/// Builds a minimal payload for a table, for use in tests.
#[cfg(test)]
pub(crate) fn sample_payload(table: &str) -> ScanPayload {
    use super::types::DataSample;

    ScanPayload {
        data_source_name: "SF_DS".into(),
        object_name: table.split('.').map(String::from).collect(),
        data_samples: vec![DataSample {
            column_name: "email".into(),
            samples: vec!["email: a@example.com".into()],
        }],
    }
}
