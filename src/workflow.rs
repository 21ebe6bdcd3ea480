//! The upload → preview → extract → display → reset workflow.
//!
//! [`UploadWorkflow`] owns the one selected file, its preview, the last
//! result and the current alert. It never performs I/O itself: every input is
//! an [`Event`], and [`UploadWorkflow::handle`] maps each event kind to one
//! transition function which may return a [`Command`] for the caller to run.
//! Running a command ([`execute`]) yields the completion event to feed back.
//! This keeps the state machine testable without a UI or a network.
//!
//! ```text
//!            FileChosen(valid)            ExtractRequested
//!   Idle ───────────────────▶ FileSelected ───────────────▶ Extracting
//!    ▲                           ▲   ▲                          │
//!    │ ResetRequested            │   └── failure / no text ─────┤
//!    │ (from any phase)          │                              │ text
//!    └───────────────────────────┴──────── ResultReady ◀────────┘
//! ```
//!
//! The phase is derived, not stored: see [`UploadWorkflow::phase`]. Alerts
//! are a side channel that any transition may set or clear.
//!
//! ## Ordering
//!
//! At most one extraction is in flight; a second request while busy is
//! ignored, not queued. Each selection (and each reset that discards state)
//! advances a generation counter, and completions are applied only when they
//! carry the current generation, so a slow response can never overwrite a
//! newer selection. The guard is held by the outstanding request itself, not
//! by the selection: after a reselect or reset the old request still blocks
//! new ones until its (discarded) completion arrives.

use crate::error::{ExtractError, INVALID_FILE_MESSAGE};
use crate::output::ExtractionResult;
use crate::pipeline::input::{validate, SelectedFile};
use crate::pipeline::ocr::OcrClient;
use crate::pipeline::preview::{self, Preview};
use crate::present::{present, Alert};
use crate::progress::{NoopObserver, SharedObserver};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Alert text when extraction is requested with nothing selected.
pub const NO_FILE_MESSAGE: &str = "Please select an image file first.";

/// Where the workflow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing selected.
    Idle,
    /// A valid image is selected; no visible result.
    FileSelected,
    /// The OCR request is in flight.
    Extracting,
    /// A non-blank result is shown.
    ResultReady,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::FileSelected => "file selected",
            Phase::Extracting => "extracting",
            Phase::ResultReady => "result ready",
        };
        f.write_str(s)
    }
}

/// Inputs to the workflow.
#[derive(Debug, Clone)]
pub enum Event {
    /// The user picked or dropped a file. Validated on arrival.
    FileChosen(SelectedFile),
    /// A preview requested by [`Command::RenderPreview`] finished.
    PreviewReady {
        generation: u64,
        preview: Option<Preview>,
    },
    /// The user asked for text extraction.
    ExtractRequested,
    /// The request started by [`Command::Extract`] finished.
    ExtractionFinished {
        generation: u64,
        outcome: Result<ExtractionResult, ExtractError>,
        elapsed_ms: u64,
    },
    /// The user asked to start over.
    ResetRequested,
}

/// Work the caller must perform on the workflow's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RenderPreview { generation: u64, file: SelectedFile },
    Extract { generation: u64, file: SelectedFile },
}

/// Snapshot of everything a UI needs to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState<'a> {
    pub phase: Phase,
    pub file: Option<&'a SelectedFile>,
    pub preview: Option<&'a Preview>,
    pub alert: Option<&'a Alert>,
    /// Present only when the result panel is visible (non-blank text).
    pub result: Option<&'a ExtractionResult>,
    /// Whether an extraction request would be accepted right now.
    pub can_extract: bool,
}

/// One independent upload session.
pub struct UploadWorkflow {
    file: Option<SelectedFile>,
    preview: Option<Preview>,
    result: Option<ExtractionResult>,
    /// Failure of the last applied extraction; the alert carries its text.
    error: Option<ExtractError>,
    alert: Option<Alert>,
    /// Generation of the one outstanding extraction, if any.
    pending: Option<u64>,
    generation: u64,
    observer: SharedObserver,
}

impl Default for UploadWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UploadWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadWorkflow")
            .field("phase", &self.phase())
            .field("file", &self.file.as_ref().map(SelectedFile::name))
            .field("has_preview", &self.preview.is_some())
            .field("result", &self.result.as_ref().map(|r| r.char_count))
            .field("alert", &self.alert)
            .field("generation", &self.generation)
            .finish()
    }
}

impl UploadWorkflow {
    /// A fresh workflow in [`Phase::Idle`].
    pub fn new() -> Self {
        Self {
            file: None,
            preview: None,
            result: None,
            error: None,
            alert: None,
            pending: None,
            generation: 0,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach an observer that mirrors transitions and alerts.
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    // ── Derived state ────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        if self.extracting_current() {
            Phase::Extracting
        } else if self.visible_result().is_some() {
            Phase::ResultReady
        } else if self.file.is_some() {
            Phase::FileSelected
        } else {
            Phase::Idle
        }
    }

    pub fn view(&self) -> UiState<'_> {
        UiState {
            phase: self.phase(),
            file: self.file.as_ref(),
            preview: self.preview.as_ref(),
            alert: self.alert.as_ref(),
            result: self.visible_result(),
            can_extract: self.file.is_some() && self.pending.is_none(),
        }
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// The last applied result, including a blank one.
    pub fn last_result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref()
    }

    /// Why the last applied extraction failed, if it did.
    pub fn last_error(&self) -> Option<&ExtractError> {
        self.error.as_ref()
    }

    /// Whether any extraction is outstanding, including one whose response
    /// will be discarded.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn extracting_current(&self) -> bool {
        self.pending == Some(self.generation)
    }

    fn visible_result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref().filter(|r| !r.is_blank())
    }

    // ── Dispatch ─────────────────────────────────────────────────────────

    /// Apply one event and return the work it triggers, if any.
    #[must_use = "a returned Command must be executed and its completion fed back"]
    pub fn handle(&mut self, event: Event) -> Option<Command> {
        let before = self.phase();
        let command = match event {
            Event::FileChosen(file) => self.on_file_chosen(file),
            Event::PreviewReady {
                generation,
                preview,
            } => self.on_preview_ready(generation, preview),
            Event::ExtractRequested => self.on_extract_requested(),
            Event::ExtractionFinished {
                generation,
                outcome,
                elapsed_ms,
            } => self.on_extraction_finished(generation, outcome, elapsed_ms),
            Event::ResetRequested => self.on_reset(),
        };
        let after = self.phase();
        if before != after {
            debug!("Workflow: {} → {}", before, after);
            self.observer.on_phase_change(before, after);
        }
        command
    }

    fn on_file_chosen(&mut self, file: SelectedFile) -> Option<Command> {
        if let Err(e) = validate(&file) {
            warn!("Rejected selection: {}", e);
            self.show_alert(Alert::error(INVALID_FILE_MESSAGE));
            return None;
        }

        if self.extracting_current() {
            info!("New selection while extracting; the pending response will be discarded");
        }
        self.generation += 1;
        self.preview = None;
        self.result = None;
        self.error = None;
        self.clear_alert();
        debug!(
            "Selected '{}' ({} bytes), generation {}",
            file.name(),
            file.size(),
            self.generation
        );
        self.file = Some(file.clone());

        Some(Command::RenderPreview {
            generation: self.generation,
            file,
        })
    }

    fn on_preview_ready(&mut self, generation: u64, preview: Option<Preview>) -> Option<Command> {
        if generation != self.generation || self.file.is_none() {
            debug!(
                "Discarding preview for generation {} (current {})",
                generation, self.generation
            );
            return None;
        }
        self.preview = preview;
        None
    }

    fn on_extract_requested(&mut self) -> Option<Command> {
        if self.pending.is_some() {
            debug!("Extraction already in flight; request ignored");
            return None;
        }
        let Some(file) = self.file.clone() else {
            self.show_alert(Alert::error(NO_FILE_MESSAGE));
            return None;
        };

        self.clear_alert();
        self.result = None;
        self.error = None;
        self.pending = Some(self.generation);
        self.observer.on_extraction_start(file.name(), file.size());

        Some(Command::Extract {
            generation: self.generation,
            file,
        })
    }

    fn on_extraction_finished(
        &mut self,
        generation: u64,
        outcome: Result<ExtractionResult, ExtractError>,
        elapsed_ms: u64,
    ) -> Option<Command> {
        if self.pending != Some(generation) {
            warn!(
                "Ignoring completion for generation {} with no matching request",
                generation
            );
            return None;
        }
        self.pending = None;
        if generation != self.generation {
            warn!(
                "Discarding stale extraction response (generation {}, current {})",
                generation, self.generation
            );
            return None;
        }

        match outcome {
            Ok(result) => {
                let instruction = present(&result);
                self.show_alert(instruction.alert().clone());
                self.observer.on_extraction_complete(&result, elapsed_ms);
                self.result = Some(result);
            }
            Err(e) => {
                warn!("Extraction failed: {}", e);
                self.show_alert(Alert::error(e.user_message()));
                self.error = Some(e);
            }
        }
        None
    }

    fn on_reset(&mut self) -> Option<Command> {
        if self.extracting_current() || self.file.is_some() {
            self.generation += 1;
        }
        self.file = None;
        self.preview = None;
        self.result = None;
        self.error = None;
        self.clear_alert();
        None
    }

    fn show_alert(&mut self, alert: Alert) {
        self.observer.on_alert(&alert);
        self.alert = Some(alert);
    }

    fn clear_alert(&mut self) {
        if self.alert.take().is_some() {
            self.observer.on_alert_cleared();
        }
    }

    // ── Async driver ─────────────────────────────────────────────────────

    /// Choose `file` and wait for its preview. Returns `false` if refused.
    pub async fn select(&mut self, file: SelectedFile) -> bool {
        match self.handle(Event::FileChosen(file)) {
            Some(command) => {
                let done = execute(command, None).await;
                let _ = self.handle(done);
                true
            }
            None => false,
        }
    }

    /// Run one extraction against `client` and apply its outcome.
    ///
    /// A no-op while another extraction is in flight. Returns the phase
    /// after the response was applied.
    pub async fn extract(&mut self, client: &OcrClient) -> Phase {
        if let Some(command) = self.handle(Event::ExtractRequested) {
            let done = execute(command, Some(client)).await;
            let _ = self.handle(done);
        }
        self.phase()
    }

    /// Return to [`Phase::Idle`], dropping selection, preview, result and alert.
    pub fn reset(&mut self) {
        let _ = self.handle(Event::ResetRequested);
    }
}

/// Perform `command` and produce the event that reports its completion.
///
/// `client` is required for [`Command::Extract`]; without one the extraction
/// completes as a network failure.
pub async fn execute(command: Command, client: Option<&OcrClient>) -> Event {
    match command {
        Command::RenderPreview { generation, file } => Event::PreviewReady {
            generation,
            preview: preview::render(&file).await,
        },
        Command::Extract { generation, file } => {
            let start = Instant::now();
            let outcome = match client {
                Some(client) => client.extract(&file).await,
                None => Err(ExtractError::Network {
                    endpoint: "<none>".into(),
                    reason: "no OCR client configured".into(),
                }),
            };
            Event::ExtractionFinished {
                generation,
                outcome,
                elapsed_ms: start.elapsed().as_millis() as u64,
            }
        }
    }
}
