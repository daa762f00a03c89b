//! HTTP client for the scanning service.
//!
//! Implements the `ScanService` trait against the remote REST API. All three
//! endpoints use PUT with bearer auth and wrap results in a
//! `{success, data, error}` envelope.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::scan::types::{
    ApiError, ReportPage, ReportRequest, ReportRequestData, ReportResponse, ScanPayload,
    StatusResponse, SubmitResponse,
};
use crate::scan::{ScanService, StatusPoll};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP implementation of the scanning service.
#[derive(Debug, Clone)]
pub struct HttpScanService {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpScanService {
    /// Creates a new client for the service at `base_url`, authenticating
    /// with the given bearer key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ScanError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Issues a PUT request with a JSON body and decodes the JSON response.
    ///
    /// Transport failures and non-JSON bodies are mapped through `make_error`
    /// so each endpoint surfaces its own error category.
    async fn put_json<B, R>(
        &self,
        path: &str,
        body: &B,
        make_error: fn(String) -> ScanError,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!("PUT {url}");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    make_error("Request timed out".to_string())
                } else if e.is_connect() {
                    make_error(format!(
                        "Failed to connect to the scanning service at {}",
                        self.base_url
                    ))
                } else {
                    make_error(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| make_error(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(make_error(format!(
                "Service returned HTTP {status}: {text}"
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| make_error(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl ScanService for HttpScanService {
    async fn submit_scan(&self, payload: &ScanPayload) -> Result<String> {
        // The submit endpoint takes an array of payloads; we send one per call.
        let body = [payload];
        let response: SubmitResponse = self
            .put_json("/data-scan/data-scan-async", &body, ScanError::Submission)
            .await?;

        if !response.success {
            return Err(ScanError::submission(ApiError::message_or_default(
                response.error,
            )));
        }

        response
            .data
            .map(|data| data.tracking_id)
            .ok_or_else(|| ScanError::submission("response carried no tracking ID"))
    }

    async fn scan_status(&self, tracking_id: &str) -> Result<StatusPoll> {
        let body = [tracking_id];
        let response: StatusResponse = self
            .put_json("/data-scan/status", &body, ScanError::ScanFailed)
            .await?;

        // An unsuccessful envelope is not terminal for the job; the poll
        // loop decides whether to keep waiting.
        if !response.success {
            return Ok(StatusPoll::Unavailable(ApiError::message_or_default(
                response.error,
            )));
        }

        response
            .data
            .and_then(|entries| {
                entries
                    .first()
                    .map(|entry| StatusPoll::Reported(entry.request_status))
            })
            .ok_or_else(|| {
                ScanError::scan_failed(format!("no status returned for tracking ID {tracking_id}"))
            })
    }

    async fn fetch_report_page(
        &self,
        data_source_name: &str,
        object_name: &[String],
        page_token: Option<&str>,
    ) -> Result<ReportPage> {
        let body = ReportRequest {
            data: ReportRequestData {
                data_source_name: data_source_name.to_string(),
                object_name: object_name.to_vec(),
            },
            next_page_token: page_token.map(String::from),
        };

        let response: ReportResponse = self
            .put_json("/data-scan/objects/details", &body, ScanError::Report)
            .await?;

        if !response.success {
            return Err(ScanError::report(ApiError::message_or_default(
                response.error,
            )));
        }

        let details = response.data.map(|data| data.details).unwrap_or_default();

        Ok(ReportPage {
            details,
            next_page_token: response.next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let service = HttpScanService::new("https://scan.example.com/api/", "key").unwrap();
        assert_eq!(service.base_url, "https://scan.example.com/api");
    }

    #[test]
    fn test_new_keeps_clean_base_url() {
        let service = HttpScanService::new("https://scan.example.com/api", "key").unwrap();
        assert_eq!(service.base_url, "https://scan.example.com/api");
    }

    #[test]
    fn test_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpScanService>();
    }
}
