//! Pipeline stages behind the upload workflow.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the workflow only composes them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ preview          (local, no network)
//!   │
//!   └────▶ ocr ──▶ ExtractionResult
//! (validate)  (multipart POST)
//! ```
//!
//! 1. [`input`]  : load the chosen file, declare its type, validate it
//! 2. [`preview`]: base64 data URL for display; runs in `spawn_blocking`
//! 3. [`ocr`]    : the single HTTP request; the only stage with network I/O

pub mod input;
pub mod ocr;
pub mod preview;
