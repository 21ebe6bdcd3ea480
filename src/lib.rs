//! # snap2text
//!
//! Send a screenshot to an OCR endpoint and get its text back.
//!
//! The OCR itself runs on a remote service; this crate is the client side of
//! that exchange: validate the chosen file, show a local preview, make the one
//! multipart request, and present, copy or save the result. The whole cycle is
//! a small state machine ([`UploadWorkflow`]) that is independent of any UI
//! toolkit, so a terminal, a desktop window or a test can drive it.
//!
//! ## Workflow Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Select   declared type must be image/*  (else alert, stay put)
//!  ├─ 2. Preview  base64 data URL, local only
//!  ├─ 3. Extract  POST multipart `file` → { "text": … }
//!  ├─ 4. Present  success alert + counts, or "no text detected"
//!  └─ 5. Keep     copy to clipboard / save as <name>-ocr.txt
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snap2text::{ClientConfig, OcrClient, Phase, SelectedFile, UploadWorkflow};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .endpoint("http://localhost:8000/extract-text")
//!         .build()?;
//!     let client = OcrClient::new(&config)?;
//!
//!     let mut workflow = UploadWorkflow::new();
//!     workflow.select(SelectedFile::open("screenshot.png").await?).await;
//!     if workflow.extract(&client).await == Phase::ResultReady {
//!         let result = workflow.view().result.expect("visible result");
//!         println!("{}", result.text);
//!     } else if let Some(alert) = workflow.alert() {
//!         eprintln!("{}", alert.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `snap2text` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod clipboard;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod present;
pub mod progress;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use clipboard::{copy, ClipboardBackend, Osc52Clipboard, SystemClipboard};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_ENDPOINT};
pub use error::{ExtractError, Snap2TextError, ValidationError};
pub use output::{ExtractionResult, TextStats};
pub use pipeline::input::{validate, SelectedFile};
pub use pipeline::ocr::OcrClient;
pub use pipeline::preview::Preview;
pub use present::{download, present, Alert, AlertLevel, RenderInstruction};
pub use progress::{NoopObserver, SharedObserver, WorkflowObserver};
pub use workflow::{execute, Command, Event, Phase, UiState, UploadWorkflow};
