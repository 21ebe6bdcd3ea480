//! Input selection: load a user-chosen file and decide whether it may be sent.
//!
//! A [`SelectedFile`] carries exactly what a browser file handle carries: raw
//! bytes, a display name, a byte size and a *declared* MIME type. The declared
//! type comes from the file name (or an explicit override), never from content
//! sniffing, so validation behaves the same way a file picker's `accept=` does.
//!
//! [`validate`] is the gate in front of the workflow. It fails closed: a file
//! with no type information is refused.

use crate::error::{Snap2TextError, ValidationError};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// The file currently chosen by the user.
///
/// Bytes are held behind an `Arc` so the preview and upload stages can each
/// take a handle without copying the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime: Option<String>,
    bytes: Arc<[u8]>,
}

impl SelectedFile {
    /// Build a file from in-memory bytes, as a drop or paste event would.
    pub fn from_bytes(
        name: impl Into<String>,
        mime: Option<&str>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime: mime
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, declaring its type from the file extension.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Snap2TextError> {
        let path = path.as_ref();
        let mime = declared_mime_for_path(path);
        Self::open_as(path, mime).await
    }

    /// Read a file from disk with an explicit declared type.
    pub async fn open_as(
        path: impl AsRef<Path>,
        mime: Option<String>,
    ) -> Result<Self, Snap2TextError> {
        let path = path.as_ref().to_path_buf();
        let bytes = tokio::fs::read(&path).await.map_err(|e| read_error(path.clone(), e))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(
            "Loaded '{}' ({} bytes, declared type {:?})",
            name,
            bytes.len(),
            mime
        );
        Ok(Self::from_bytes(name, mime.as_deref(), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared MIME type, if any.
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the raw bytes.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// File name with the last extension removed, used to name saved output.
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }
}

/// Accept a file if and only if its declared type begins with `image/`.
///
/// No side effects. The comparison is case-insensitive on the type prefix,
/// matching how MIME types are defined.
pub fn validate(file: &SelectedFile) -> Result<(), ValidationError> {
    match file.mime() {
        None => Err(ValidationError::MissingType {
            name: file.name().to_string(),
        }),
        Some(mime) if is_image_mime(mime) => Ok(()),
        Some(mime) => Err(ValidationError::NotAnImage {
            name: file.name().to_string(),
            mime: mime.to_string(),
        }),
    }
}

fn is_image_mime(mime: &str) -> bool {
    mime.get(..6)
        .map(|prefix| prefix.eq_ignore_ascii_case("image/"))
        .unwrap_or(false)
}

/// Declared type for a path, derived from its extension.
///
/// Image extensions resolve through the `image` crate's format table; a few
/// common document types are named so they can be refused with a useful
/// message. Anything else has no declared type.
pub fn declared_mime_for_path(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if let Some(format) = ImageFormat::from_extension(&ext) {
        return Some(format.to_mime_type().to_string());
    }
    let mime = match ext.as_str() {
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime.to_string())
}

/// Strip the last extension from a display name.
pub(crate) fn base_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

fn read_error(path: PathBuf, e: std::io::Error) -> Snap2TextError {
    match e.kind() {
        std::io::ErrorKind::NotFound => Snap2TextError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => Snap2TextError::PermissionDenied { path },
        _ => Snap2TextError::ReadFailed { path, source: e },
    }
}
