//! Configuration for the OCR client.
//!
//! The only externally supplied value the system needs is the OCR endpoint
//! URL. Timeouts ride along in the same struct so that one [`ClientConfig`]
//! fully describes how the single outbound request is made.

use crate::error::Snap2TextError;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Endpoint used when none is configured: the backend's default route on
/// a local development server.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/extract-text";

/// Configuration for [`crate::pipeline::ocr::OcrClient`].
///
/// Built via [`ClientConfig::builder()`] or using
/// [`ClientConfig::default()`].
///
/// # Example
/// ```rust
/// use snap2text::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .endpoint("https://ocr.example.com/extract-text")
///     .timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.timeout_secs, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Absolute `http`/`https` URL that receives the multipart upload.
    pub endpoint: String,

    /// Whole-request timeout in seconds. Default: 60.
    ///
    /// OCR on a large screenshot can take several seconds server-side, so
    /// this bounds the entire exchange rather than just the connect phase.
    pub timeout_secs: u64,

    /// TCP/TLS connect timeout in seconds. Default: 10.
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// The endpoint parsed as a URL.
    pub fn endpoint_url(&self) -> Result<Url, Snap2TextError> {
        parse_endpoint(&self.endpoint)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, Snap2TextError> {
        let c = &self.config;
        parse_endpoint(&c.endpoint)?;
        if c.timeout_secs == 0 {
            return Err(Snap2TextError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.connect_timeout_secs == 0 {
            return Err(Snap2TextError::InvalidConfig(
                "Connect timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, Snap2TextError> {
    let url = Url::parse(endpoint.trim()).map_err(|e| {
        Snap2TextError::InvalidConfig(format!("Endpoint '{endpoint}' is not a valid URL: {e}"))
    })?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(Snap2TextError::InvalidConfig(format!(
            "Endpoint must be an http:// or https:// URL, got '{endpoint}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        let c = ClientConfig::default();
        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(c.timeout_secs, 60);
        assert!(ClientConfig::builder().build().is_ok());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let err = ClientConfig::builder()
            .endpoint("ftp://example.com/ocr")
            .build()
            .unwrap_err();
        assert!(matches!(err, Snap2TextError::InvalidConfig(_)));

        let err = ClientConfig::builder().endpoint("not a url").build().unwrap_err();
        assert!(err.to_string().contains("not a valid URL"), "got: {err}");
    }

    #[test]
    fn rejects_zero_timeouts() {
        assert!(ClientConfig::builder().timeout_secs(0).build().is_err());
        assert!(ClientConfig::builder().connect_timeout_secs(0).build().is_err());
    }

    #[test]
    fn endpoint_url_roundtrips() {
        let c = ClientConfig::builder()
            .endpoint("https://ocr.example.com:8443/extract-text")
            .build()
            .unwrap();
        let url = c.endpoint_url().unwrap();
        assert_eq!(url.port(), Some(8443));
        assert_eq!(url.path(), "/extract-text");
    }
}
