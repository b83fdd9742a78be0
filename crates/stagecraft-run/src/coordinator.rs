//! Generation-token bookkeeping for cancellable runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use stagecraft_core::{PipelineRun, RunOutcome};

/// Owns the monotonically increasing generation counter and the latest
/// accepted run. One coordinator per session.
#[derive(Debug, Default)]
pub struct RunCoordinator {
    generation: AtomicU64,
    latest: Mutex<Option<PipelineRun>>,
}

impl RunCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation and return its token. Any run holding an
    /// older token is superseded from this moment.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.current()
    }

    /// Invalidate whatever run is in flight without starting a new one.
    /// Called when the graph is edited mid-run.
    pub fn invalidate(&self) {
        self.begin();
    }

    /// Accept a finished run unless its token has gone stale. Returns
    /// whether the run became visible.
    pub fn commit(&self, run: PipelineRun) -> bool {
        if run.outcome == RunOutcome::Superseded || !self.is_current(run.generation) {
            return false;
        }
        let mut latest = self.latest.lock().expect("coordinator lock poisoned");
        *latest = Some(run);
        true
    }

    /// The most recently accepted run, if any.
    pub fn latest(&self) -> Option<PipelineRun> {
        self.latest.lock().expect("coordinator lock poisoned").clone()
    }

    /// Drop the visible run. Used when the graph becomes invalid so
    /// downstream consumers never show stale results.
    pub fn clear(&self) {
        let mut latest = self.latest.lock().expect("coordinator lock poisoned");
        *latest = None;
    }
}
