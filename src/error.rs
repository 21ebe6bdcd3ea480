//! Error types for the snap2text library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`Snap2TextError`]: **Fatal** for the current operation: the file
//!   could not be read, the configuration is invalid, the result could not
//!   be written. Returned as `Err(Snap2TextError)` from the library entry
//!   points that touch the local machine.
//!
//! * [`ValidationError`]: a candidate file was refused before anything was
//!   sent anywhere. Recovered locally: the workflow stays where it was and
//!   shows an alert.
//!
//! * [`ExtractError`]: the single OCR request failed. Never fatal to the
//!   workflow, which returns to `FileSelected` with an alert built from
//!   [`ExtractError::user_message`].

use std::path::PathBuf;
use thiserror::Error;

/// Alert text shown whenever a selection is refused.
pub const INVALID_FILE_MESSAGE: &str =
    "Please upload a valid image file (PNG, JPG, GIF, BMP, TIFF or WEBP).";

/// All fatal errors returned by the snap2text library.
#[derive(Debug, Error)]
pub enum Snap2TextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading its bytes failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed (TLS backend, proxy settings).
    #[error("Failed to initialise HTTP client: {0}")]
    HttpClient(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the saved text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither the system clipboard nor the fallback accepted the text.
    #[error("Copy to clipboard failed: {reason}")]
    ClipboardUnavailable { reason: String },
}

/// Why a candidate file was refused by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The file carries no type information at all.
    #[error("'{name}' has no declared file type")]
    MissingType { name: String },

    /// The declared type is not `image/*`.
    #[error("'{name}' is '{mime}', not an image")]
    NotAnImage { name: String, mime: String },
}

/// A failed OCR request.
///
/// Only [`ExtractError::Network`] and [`ExtractError::Timeout`] mean the
/// server may never have seen the request; every other variant means a
/// response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractError {
    /// Endpoint unreachable: DNS failure, refused connection, TLS failure.
    #[error("Network error contacting '{endpoint}': {reason}")]
    Network { endpoint: String, reason: String },

    /// Endpoint reachable but answered with a non-success status.
    #[error("Server error (HTTP {status}){}", detail_suffix(.detail))]
    Server { status: u16, detail: Option<String> },

    /// A success status arrived with a body that is not JSON.
    #[error("Malformed response from OCR server: {detail}")]
    Parse { detail: String },

    /// No response within the configured request timeout.
    #[error("OCR request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The multipart body could not be assembled from the selected file.
    #[error("Could not build OCR request: {detail}")]
    InvalidRequest { detail: String },
}

impl ExtractError {
    /// Alert text for this failure, as shown to the user.
    ///
    /// Network failures point at connectivity; server failures prefer the
    /// server's own `detail`.
    pub fn user_message(&self) -> String {
        match self {
            ExtractError::Network { endpoint, .. } => format!(
                "Could not connect to the OCR backend at {endpoint}. \
                 Check your connection and make sure the server is running."
            ),
            ExtractError::Server {
                detail: Some(detail),
                ..
            } => format!("Extraction failed: {detail}"),
            ExtractError::Server {
                status,
                detail: None,
            } => format!("Extraction failed: server responded with HTTP {status}."),
            ExtractError::Parse { .. } => {
                "Extraction failed: the OCR server sent a response that could not be read."
                    .to_string()
            }
            ExtractError::Timeout { secs } => format!(
                "The OCR request timed out after {secs}s. Try again or use a smaller image."
            ),
            ExtractError::InvalidRequest { detail } => {
                format!("Extraction failed: could not prepare the upload ({detail}).")
            }
        }
    }

    /// `true` when the request never got a response.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            ExtractError::Network { .. } | ExtractError::Timeout { .. }
        )
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}
