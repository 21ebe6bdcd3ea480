//! Observer trait for workflow events.
//!
//! Inject an [`Arc<dyn WorkflowObserver>`] via
//! [`crate::workflow::UploadWorkflow::with_observer`] to mirror the workflow
//! into a UI: toggle a busy indicator while extracting, show and hide alerts,
//! reveal the result panel.
//!
//! # Example
//!
//! ```rust
//! use snap2text::{Phase, UploadWorkflow, WorkflowObserver};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct BusyCounter {
//!     extractions: AtomicUsize,
//! }
//!
//! impl WorkflowObserver for BusyCounter {
//!     fn on_phase_change(&self, _from: Phase, to: Phase) {
//!         if to == Phase::Extracting {
//!             self.extractions.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let observer = Arc::new(BusyCounter { extractions: AtomicUsize::new(0) });
//! let workflow = UploadWorkflow::new().with_observer(observer.clone());
//! assert_eq!(workflow.phase(), Phase::Idle);
//! ```

use crate::output::ExtractionResult;
use crate::present::Alert;
use crate::workflow::Phase;
use std::sync::Arc;

/// Called by [`crate::workflow::UploadWorkflow`] as it handles events.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Calls arrive on whichever task drives the workflow,
/// one at a time.
pub trait WorkflowObserver: Send + Sync {
    /// The derived phase changed.
    fn on_phase_change(&self, from: Phase, to: Phase) {
        let _ = (from, to);
    }

    /// An alert replaced whatever was shown before.
    fn on_alert(&self, alert: &Alert) {
        let _ = alert;
    }

    /// The alert area was cleared.
    fn on_alert_cleared(&self) {}

    /// The upload for `file_name` is about to be sent.
    ///
    /// # Arguments
    /// * `file_name`: display name of the selected file
    /// * `size`     : byte size of the upload
    fn on_extraction_start(&self, file_name: &str, size: usize) {
        let _ = (file_name, size);
    }

    /// A response for the current selection was applied.
    ///
    /// # Arguments
    /// * `result`    : the accepted result (text may be blank)
    /// * `elapsed_ms`: wall-clock time of the request
    fn on_extraction_complete(&self, result: &ExtractionResult, elapsed_ms: u64) {
        let _ = (result, elapsed_ms);
    }
}

/// A no-op implementation for callers that don't need events.
///
/// This is the default when no observer is configured.
pub struct NoopObserver;

impl WorkflowObserver for NoopObserver {}

/// Convenience alias matching the type held by the workflow.
pub type SharedObserver = Arc<dyn WorkflowObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::present::Alert;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Tracking {
        phases: Mutex<Vec<(Phase, Phase)>>,
        alerts: Mutex<Vec<String>>,
    }

    impl WorkflowObserver for Tracking {
        fn on_phase_change(&self, from: Phase, to: Phase) {
            self.phases.lock().unwrap().push((from, to));
        }

        fn on_alert(&self, alert: &Alert) {
            self.alerts.lock().unwrap().push(alert.message.clone());
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let o = NoopObserver;
        o.on_phase_change(Phase::Idle, Phase::FileSelected);
        o.on_alert(&Alert::error("x"));
        o.on_alert_cleared();
        o.on_extraction_start("a.png", 10);
        o.on_extraction_complete(&ExtractionResult::new("t", "a.png"), 5);
    }

    #[test]
    fn tracking_observer_receives_events() {
        let t = Tracking::default();
        t.on_phase_change(Phase::Idle, Phase::FileSelected);
        t.on_alert(&Alert::success("done"));
        assert_eq!(
            *t.phases.lock().unwrap(),
            vec![(Phase::Idle, Phase::FileSelected)]
        );
        assert_eq!(*t.alerts.lock().unwrap(), vec!["done"]);
    }

    #[test]
    fn arc_dyn_observer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn WorkflowObserver>();
        let o: SharedObserver = Arc::new(NoopObserver);
        o.on_alert_cleared();
    }
}
