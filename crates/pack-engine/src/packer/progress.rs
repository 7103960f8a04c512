//! Progress reporting and cooperative cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Upper bound on progress notifications per run
const MAX_REPORTS: usize = 200;

/// Receives the completed fraction of a packing run, in `[0, 1]`
pub trait ProgressSink {
    fn report(&mut self, fraction: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, fraction: f64) {
        self(fraction)
    }
}

/// Discards progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _fraction: f64) {}
}

/// Shared cancellation flag, checked by the engine between boxes
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Counts work units and throttles notifications
pub(crate) struct ProgressTracker<'a> {
    sink: &'a mut dyn ProgressSink,
    total: usize,
    done: usize,
    stride: usize,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink, total: usize) -> Self {
        let stride = (total / MAX_REPORTS).max(1);
        sink.report(0.0);
        Self {
            sink,
            total,
            done: 0,
            stride,
        }
    }

    /// Record one processed box
    pub fn advance(&mut self) {
        self.done += 1;
        if self.done % self.stride == 0 && self.done < self.total {
            self.sink.report(self.done as f64 / self.total as f64);
        }
    }

    pub fn finish(self) {
        self.sink.report(1.0);
    }
}
