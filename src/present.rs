//! Turning an [`ExtractionResult`] into what the user sees and keeps.
//!
//! [`present`] is pure: it decides which alert to show and whether the result
//! panel is revealed. [`download`] writes the text to `<base>-ocr.txt`.
//! Copying lives in [`crate::clipboard`].

use crate::error::Snap2TextError;
use crate::output::{ExtractionResult, TextStats};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Alert text for a successful call that found no text.
pub const NO_TEXT_MESSAGE: &str =
    "No text detected in this image. Try a clearer or higher-resolution screenshot.";

/// Suffix appended to the source base name for saved text.
pub const OUTPUT_SUFFIX: &str = "-ocr.txt";

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Success,
    /// Soft notice; the workflow did not fail.
    Warning,
    Error,
}

/// A message shown to the user alongside the workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Error,
            message: message.into(),
        }
    }
}

/// What to render for a finished extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderInstruction {
    /// Valid call, nothing recognised: show the notice, keep the panel hidden.
    NoText { alert: Alert },
    /// Show the success alert and reveal the panel with the untrimmed text.
    ShowResult {
        alert: Alert,
        text: String,
        stats: TextStats,
    },
}

impl RenderInstruction {
    pub fn alert(&self) -> &Alert {
        match self {
            RenderInstruction::NoText { alert } | RenderInstruction::ShowResult { alert, .. } => {
                alert
            }
        }
    }

    /// `true` when the result panel should be visible.
    pub fn reveals_result(&self) -> bool {
        matches!(self, RenderInstruction::ShowResult { .. })
    }
}

/// Decide how to show `result`.
pub fn present(result: &ExtractionResult) -> RenderInstruction {
    if result.is_blank() {
        return RenderInstruction::NoText {
            alert: Alert::warning(NO_TEXT_MESSAGE),
        };
    }
    let stats = result.stats();
    RenderInstruction::ShowResult {
        alert: Alert::success(format!(
            "Text extracted successfully! {} characters found.",
            stats.chars
        )),
        text: result.text.clone(),
        stats,
    }
}

/// File name for saved text: `<base>-ocr.txt`.
///
/// Only the last path component of `base_name` is used, so the name always
/// stays inside the target directory.
pub fn output_file_name(base_name: &str) -> String {
    let base = base_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let base = match base {
        "" | "." | ".." => "extracted",
        other => other,
    };
    format!("{base}{OUTPUT_SUFFIX}")
}

/// Save `text` as UTF-8 plain text in `dir`, named after `base_name`.
///
/// The file content is exactly `text`; nothing is trimmed or appended.
/// Returns the path written.
pub async fn download(
    text: &str,
    base_name: &str,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, Snap2TextError> {
    let path = dir.as_ref().join(output_file_name(base_name));
    tokio::fs::write(&path, text.as_bytes())
        .await
        .map_err(|e| Snap2TextError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
    info!("Saved {} bytes of text to {}", text.len(), path.display());
    Ok(path)
}
