//! Local preview: selected image → base64 `data:` URL.
//!
//! No network is involved. The bytes already held by the [`SelectedFile`] are
//! base64-encoded on the blocking pool (large screenshots are several MB and
//! encoding them would stall the event loop) and wrapped in a data URL that
//! any image sink can display directly.
//!
//! A preview failure is never an error for the caller: [`render`] returns
//! `None` and the workflow simply has no preview.

use crate::pipeline::input::SelectedFile;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageReader;
use std::io::Cursor;
use tracing::{debug, warn};

/// A displayable preview of the selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
    /// Pixel dimensions when the image header could be decoded.
    pub dimensions: Option<(u32, u32)>,
}

/// Produce a preview for `file`, suspending until the encode completes.
///
/// Returns `None` when the file has no declared type or the encode task
/// fails; the caller treats that as "no preview".
pub async fn render(file: &SelectedFile) -> Option<Preview> {
    let Some(mime) = file.mime().map(str::to_string) else {
        warn!("No preview for '{}': no declared type", file.name());
        return None;
    };
    let bytes = file.shared_bytes();

    let result = tokio::task::spawn_blocking(move || {
        let dimensions = probe_dimensions(&bytes);
        Preview {
            data_url: data_url(&mime, &bytes),
            dimensions,
        }
    })
    .await;

    match result {
        Ok(preview) => {
            debug!(
                "Preview ready for '{}' → {} bytes data URL, dimensions {:?}",
                file.name(),
                preview.data_url.len(),
                preview.dimensions
            );
            Some(preview)
        }
        Err(e) => {
            warn!("Preview failed for '{}': {}", file.name(), e);
            None
        }
    }
}

/// Encode raw bytes as a `data:` URL with the given MIME type.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Read width/height from the image header without decoding pixels.
fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
