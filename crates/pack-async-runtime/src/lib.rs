mod worker;

use thiserror::Error;

pub use worker::{PackerHandle, spawn_worker, worker_task};

// Re-export types from the engine crate
pub use pack_engine::{ErrorKind, PackError, PackFailure, PackRequest, PackedLayout};

/// Handle to a packing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub u64);

/// Commands sent from the caller to the worker
#[derive(Debug)]
pub enum PackCommand {
    /// Begin a run on an immutable snapshot of the request
    Start { run: RunId, request: PackRequest },
    /// Stop an in-flight run; no layout will be produced for it
    Cancel { run: RunId },
}

/// Updates sent from the worker to the caller
#[derive(Debug, Clone)]
pub enum PackUpdate {
    Progress { run: RunId, fraction: f64 },
    Complete { run: RunId, layout: PackedLayout },
    Failed { run: RunId, failure: PackFailure },
    Cancelled { run: RunId },
}

impl PackUpdate {
    pub fn run(&self) -> RunId {
        match self {
            PackUpdate::Progress { run, .. }
            | PackUpdate::Complete { run, .. }
            | PackUpdate::Failed { run, .. }
            | PackUpdate::Cancelled { run } => *run,
        }
    }

    /// Completion, failure and cancellation end a run
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PackUpdate::Progress { .. })
    }
}

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Packing worker has stopped")]
    WorkerStopped,
}
