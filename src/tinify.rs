use crate::compress::{CompressionService, QuotaCounter, RemoteError};
use crate::constants::{
    COMPRESSION_COUNT_HEADER, MONTHLY_COMPRESSION_LIMIT, TINIFY_API_URL, TINIFY_TIMEOUT_SECS,
};
use crate::error::{Result, SqueezeError};
use reqwest::blocking::{Client, Response};
use reqwest::header::LOCATION;
use serde::Deserialize;
use serde_json::json;
use std::cell::Cell;
use std::time::Duration;

/// Metadata classes the service can carry over into its output.
pub const PRESERVABLE_METADATA: &[&str] = &["copyright", "creation", "location"];

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ShrinkOutput {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ShrinkResponse {
    output: ShrinkOutput,
}

/// Blocking client for the TinyPNG HTTP API.
///
/// Also tracks the account's monthly compression count, which every response
/// reports in a header.
pub struct TinifyClient {
    http: Client,
    api_key: String,
    base_url: String,
    preserve: Vec<String>,
    compression_count: Cell<Option<u32>>,
}

impl TinifyClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SqueezeError::MissingApiKey);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(TINIFY_TIMEOUT_SECS))
            .user_agent(concat!("photo-squeeze/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SqueezeError::CompressionFailed(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: TINIFY_API_URL.to_string(),
            preserve: Vec::new(),
            compression_count: Cell::new(None),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Asks the service to keep the given metadata classes in its output.
    pub fn with_preserve(mut self, preserve: Vec<String>) -> Self {
        self.preserve = preserve;
        self
    }

    /// Checks the key without spending a compression and refreshes the count.
    pub fn validate(&self) -> std::result::Result<u32, RemoteError> {
        let response = self
            .http
            .post(self.shrink_url())
            .basic_auth("api", Some(&self.api_key))
            .send()
            .map_err(|e| RemoteError::Connection(e.to_string()))?;
        self.record_count(&response);

        let status = response.status().as_u16();
        // An empty upload is rejected as a bad request once the key is accepted.
        if status == 400 || response.status().is_success() {
            return Ok(self.compression_count.get().unwrap_or(0));
        }
        // The key is valid but this month's allowance is used up.
        if status == 429 {
            return Ok(self
                .compression_count
                .get()
                .unwrap_or(MONTHLY_COMPRESSION_LIMIT));
        }
        let body = response.text().unwrap_or_default();
        Err(classify_status(status, parse_error_body(status, &body)))
    }

    fn shrink_url(&self) -> String {
        format!("{}/shrink", self.base_url)
    }

    fn record_count(&self, response: &Response) {
        let count = response
            .headers()
            .get(COMPRESSION_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        if let Some(count) = count {
            tracing::debug!("remote compression count: {}", count);
            self.compression_count.set(Some(count));
        }
    }

    fn check_status(&self, response: Response) -> std::result::Result<Response, RemoteError> {
        self.record_count(&response);
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(classify_status(
            status.as_u16(),
            parse_error_body(status.as_u16(), &body),
        ))
    }

    /// Uploads the image and returns the URL of the compressed result.
    fn shrink(&self, data: &[u8]) -> std::result::Result<String, RemoteError> {
        let response = self
            .http
            .post(self.shrink_url())
            .basic_auth("api", Some(&self.api_key))
            .body(data.to_vec())
            .send()
            .map_err(|e| RemoteError::Connection(e.to_string()))?;
        let response = self.check_status(response)?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(location) = location {
            return Ok(location);
        }

        let body: ShrinkResponse = response
            .json()
            .map_err(|e| RemoteError::UnexpectedResponse(e.to_string()))?;
        Ok(body.output.url)
    }

    fn download(&self, output_url: &str) -> std::result::Result<Vec<u8>, RemoteError> {
        let request = if self.preserve.is_empty() {
            self.http.get(output_url)
        } else {
            self.http
                .post(output_url)
                .json(&json!({ "preserve": self.preserve }))
        };

        let response = request
            .basic_auth("api", Some(&self.api_key))
            .send()
            .map_err(|e| RemoteError::Connection(e.to_string()))?;
        let response = self.check_status(response)?;

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| RemoteError::Connection(e.to_string()))
    }
}

impl CompressionService for TinifyClient {
    fn compress(&self, data: &[u8]) -> std::result::Result<Vec<u8>, RemoteError> {
        let output_url = self.shrink(data)?;
        self.download(&output_url)
    }
}

impl QuotaCounter for TinifyClient {
    fn compression_count(&self) -> Option<u32> {
        self.compression_count.get()
    }
}

/// Maps an HTTP status to the kind of failure it represents.
pub fn classify_status(status: u16, message: String) -> RemoteError {
    match status {
        401 | 429 => RemoteError::Account(message),
        400..=499 => RemoteError::Client(message),
        500..=599 => RemoteError::Server(message),
        _ => RemoteError::UnexpectedResponse(message),
    }
}

fn parse_error_body(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => format!("{} (HTTP {}): {}", err.error, status, err.message),
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => format!("HTTP {}: {}", status, body.trim()),
    }
}
