//! OCR request: upload the selected image and read back the extracted text.
//!
//! This is the only network I/O in the crate. One multipart `POST` carries
//! a single part named `file`; the response is JSON of the form
//! `{ "text": string, "filename"?: string, "char_count"?: number }` on success
//! and `{ "detail": ... }` on failure.
//!
//! ## Failure mapping
//!
//! | What happened                      | Result                          |
//! |------------------------------------|---------------------------------|
//! | connect / DNS / TLS failure        | [`ExtractError::Network`]       |
//! | no response within timeout         | [`ExtractError::Timeout`]       |
//! | non-2xx status                     | [`ExtractError::Server`]        |
//! | 2xx with a body that is not JSON   | [`ExtractError::Parse`]         |
//! | 2xx JSON without a string `text`   | empty text (logged)             |
//!
//! Requests are never retried.

use crate::config::ClientConfig;
use crate::error::{ExtractError, Snap2TextError};
use crate::output::ExtractionResult;
use crate::pipeline::input::SelectedFile;
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Multipart field that carries the image.
pub const FILE_FIELD: &str = "file";

/// HTTP client bound to one configured OCR endpoint.
#[derive(Debug, Clone)]
pub struct OcrClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout_secs: u64,
}

impl OcrClient {
    /// Build a client for `config.endpoint`.
    pub fn new(config: &ClientConfig) -> Result<Self, Snap2TextError> {
        let endpoint = config.endpoint_url()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("snap2text/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Snap2TextError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Upload `file` and return the extracted text.
    pub async fn extract(&self, file: &SelectedFile) -> Result<ExtractionResult, ExtractError> {
        let start = Instant::now();
        info!(
            "Uploading '{}' ({} bytes) to {}",
            file.name(),
            file.size(),
            self.endpoint
        );

        let mut part = Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string());
        if let Some(mime) = file.mime() {
            part = part
                .mime_str(mime)
                .map_err(|e| ExtractError::InvalidRequest {
                    detail: format!("bad content type '{mime}': {e}"),
                })?;
        }
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let detail = error_detail(&body);
            warn!(
                "OCR server answered HTTP {} for '{}': {:?}",
                status.as_u16(),
                file.name(),
                detail
            );
            return Err(ExtractError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        let result = parse_success(&body, file.name())?;
        info!(
            "Extracted {} chars from '{}' in {}ms",
            result.char_count,
            file.name(),
            start.elapsed().as_millis()
        );
        Ok(result)
    }

    /// Ask the server root whether it is up, returning its status message.
    ///
    /// The health route lives at `/` on the endpoint's origin.
    pub async fn check_health(&self) -> Result<String, ExtractError> {
        let mut root = self.endpoint.clone();
        root.set_path("/");
        root.set_query(None);
        debug!("Health check: GET {}", root);

        let response = self
            .http
            .get(root)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status != StatusCode::OK {
            return Err(ExtractError::Server {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let message = serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_string());
        Ok(message)
    }

    fn transport_error(&self, e: reqwest::Error) -> ExtractError {
        if e.is_timeout() {
            ExtractError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            ExtractError::Network {
                endpoint: self.endpoint.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Parse a 2xx body into an [`ExtractionResult`].
///
/// A body that is not JSON is a [`ExtractError::Parse`]. A JSON body whose
/// `text` is missing or not a string yields empty text.
pub fn parse_success(body: &[u8], uploaded_name: &str) -> Result<ExtractionResult, ExtractError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| ExtractError::Parse {
        detail: e.to_string(),
    })?;

    let text = match value.get("text") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => {
            warn!("Response 'text' is not a string ({other}); treating as empty");
            String::new()
        }
    };
    let filename = value
        .get("filename")
        .and_then(Value::as_str)
        .filter(|f| !f.is_empty())
        .unwrap_or(uploaded_name);

    let mut result = ExtractionResult::new(text, filename);
    result.server_char_count = value
        .get("char_count")
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok());
    Ok(result)
}

/// Pull the `detail` message out of an error body.
///
/// Strings are used verbatim; any other JSON value (validation errors arrive
/// as lists) is rendered compactly. Missing or unreadable bodies give `None`.
pub fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
