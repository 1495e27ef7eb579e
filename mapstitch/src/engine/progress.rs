//! Engine progress reporting.
//!
//! External orchestration layers (task queues, web frontends) poll a
//! cheap shared snapshot instead of reimplementing the pipeline. The
//! handle is clonable and safe to read from any thread while the engine
//! runs.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Pipeline stages, in execution order.
///
/// `Failed` is terminal and reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    ResolvingGeometry,
    Fetching,
    Composing,
    GeoReferencing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::ResolvingGeometry => "resolving-geometry",
            Stage::Fetching => "fetching",
            Stage::Composing => "composing",
            Stage::GeoReferencing => "geo-referencing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub stage: Stage,
    pub tiles_done: usize,
    pub tiles_total: usize,
}

struct Inner {
    stage: Mutex<Stage>,
    tiles_done: Arc<AtomicUsize>,
    tiles_total: AtomicUsize,
}

/// Clonable handle onto a run's progress.
#[derive(Clone)]
pub struct ProgressHandle {
    inner: Arc<Inner>,
}

impl ProgressHandle {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                stage: Mutex::new(Stage::Validating),
                tiles_done: Arc::new(AtomicUsize::new(0)),
                tiles_total: AtomicUsize::new(0),
            }),
        }
    }

    /// Reads the current stage and tile counters.
    pub fn snapshot(&self) -> Progress {
        Progress {
            stage: *self.inner.stage.lock().unwrap(),
            tiles_done: self.inner.tiles_done.load(Ordering::Relaxed),
            tiles_total: self.inner.tiles_total.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn set_stage(&self, stage: Stage) {
        *self.inner.stage.lock().unwrap() = stage;
    }

    /// Clears the previous run's stage and counters so consecutive runs
    /// on one engine report from zero.
    pub(crate) fn reset(&self) {
        *self.inner.stage.lock().unwrap() = Stage::Validating;
        self.inner.tiles_done.store(0, Ordering::Relaxed);
        self.inner.tiles_total.store(0, Ordering::Relaxed);
    }

    pub(crate) fn set_total(&self, total: usize) {
        self.inner.tiles_total.store(total, Ordering::Relaxed);
    }

    /// Counter the fetcher increments per completed tile.
    pub(crate) fn done_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.inner.tiles_done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_tracks_stage_and_counts() {
        let handle = ProgressHandle::new();
        assert_eq!(handle.snapshot().stage, Stage::Validating);

        handle.set_stage(Stage::Fetching);
        handle.set_total(20);
        handle.done_counter().fetch_add(7, Ordering::Relaxed);

        let progress = handle.snapshot();
        assert_eq!(progress.stage, Stage::Fetching);
        assert_eq!(progress.tiles_done, 7);
        assert_eq!(progress.tiles_total, 20);
    }

    #[test]
    fn reset_clears_stage_and_counters() {
        let handle = ProgressHandle::new();
        handle.set_stage(Stage::Done);
        handle.set_total(20);
        handle.done_counter().fetch_add(20, Ordering::Relaxed);

        handle.reset();

        let progress = handle.snapshot();
        assert_eq!(progress.stage, Stage::Validating);
        assert_eq!(progress.tiles_done, 0);
        assert_eq!(progress.tiles_total, 0);
    }

    #[test]
    fn clones_observe_the_same_run() {
        let handle = ProgressHandle::new();
        let observer = handle.clone();
        handle.set_stage(Stage::Done);
        assert_eq!(observer.snapshot().stage, Stage::Done);
    }
}
