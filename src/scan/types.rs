//! Wire types for the scanning service API.
//!
//! Defines the scan payload submitted for classification and the response
//! envelopes returned by the submit, status, and report endpoints.

use crate::report::ReportDetail;
use serde::{Deserialize, Serialize};

/// One scan submission: samples for a bounded group of columns of one table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanPayload {
    /// Logical data source name the findings are filed under.
    pub data_source_name: String,

    /// Qualified table name split into its dot-separated parts.
    pub object_name: Vec<String>,

    /// Per-column samples, in column order.
    pub data_samples: Vec<DataSample>,
}

/// Samples for a single column, one entry per sampled row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSample {
    pub column_name: String,

    /// Formatted as `"<column>: <value>"`, in row order.
    pub samples: Vec<String>,
}

/// State of an asynchronous scan job.
///
/// `Pending` is the initial state; `Success` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanStatus {
    Pending,
    Success,
    Error,
}

impl ScanStatus {
    /// Returns true for terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

/// One page of the findings report plus the cursor for the next page.
#[derive(Debug, Clone, Default)]
pub struct ReportPage {
    pub details: Vec<ReportDetail>,

    /// Opaque cursor; `None` means this was the last page.
    pub next_page_token: Option<String>,
}

// Response envelopes. Every endpoint wraps its result in
// `{success, data, error: {message}}`.

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    pub success: bool,
    pub data: Option<SubmitData>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitData {
    pub tracking_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub success: bool,
    pub data: Option<Vec<StatusEntry>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusEntry {
    pub request_status: ScanStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportResponse {
    pub success: bool,
    pub data: Option<ReportData>,
    pub next_page_token: Option<String>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportData {
    #[serde(default)]
    pub details: Vec<ReportDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub message: Option<String>,
}

impl ApiError {
    /// Remote error message, or a placeholder when the service sent none.
    pub fn message_or_default(error: Option<Self>) -> String {
        error
            .and_then(|e| e.message)
            .unwrap_or_else(|| "no error message provided".to_string())
    }
}

/// Request body for the paginated report endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ReportRequest {
    pub data: ReportRequestData,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportRequestData {
    pub data_source_name: String,
    pub object_name: Vec<String>,
}
