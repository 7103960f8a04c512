use pack_engine::{CancelToken, PackError, PackFailure, PackRequest, pack_with_progress};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{PackCommand, PackUpdate, RunId, RuntimeError};

/// Async worker task that runs one packing job at a time and sends updates
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<PackCommand>,
    update_tx: mpsc::UnboundedSender<PackUpdate>,
) {
    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            PackCommand::Start { run, request } => {
                process_run(run, request, &mut command_rx, &update_tx).await;
            }
            PackCommand::Cancel { run } => {
                log::debug!("Ignoring cancel for {:?}, no run in flight", run);
            }
        }
    }
    log::debug!("Command channel closed, packing worker exiting");
}

async fn process_run(
    run: RunId,
    request: PackRequest,
    command_rx: &mut mpsc::UnboundedReceiver<PackCommand>,
    update_tx: &mpsc::UnboundedSender<PackUpdate>,
) {
    log::info!(
        "Starting {:?}: {} box(es), {:?}",
        run,
        request.boxes.len(),
        request.options.packing_factor
    );

    let cancel = CancelToken::new();
    let mut job = spawn_job(run, request, cancel.clone(), update_tx.clone());
    let mut commands_open = true;

    let result = loop {
        tokio::select! {
            result = &mut job => break result,
            cmd = command_rx.recv(), if commands_open => match cmd {
                Some(PackCommand::Cancel { run: target }) if target == run => {
                    log::info!("Cancelling {:?}", run);
                    cancel.cancel();
                }
                Some(PackCommand::Cancel { run: other }) => {
                    log::debug!("Ignoring cancel for {:?} while {:?} is running", other, run);
                }
                Some(PackCommand::Start { run: other, .. }) => {
                    log::warn!("Rejecting {:?}: {:?} is still running", other, run);
                    let _ = update_tx.send(PackUpdate::Failed {
                        run: other,
                        failure: PackFailure::from(&PackError::Busy),
                    });
                }
                None => {
                    // Nobody can observe the result any more
                    commands_open = false;
                    cancel.cancel();
                }
            }
        }
    };

    let update = match result {
        // A cancelled run never completes, even if the engine finished first
        _ if cancel.is_cancelled() => PackUpdate::Cancelled { run },
        Ok(Ok(layout)) => {
            log::info!(
                "Finished {:?}: {} page(s), {} unplaceable",
                run,
                layout.page_count(),
                layout.unplaceable.len()
            );
            PackUpdate::Complete { run, layout }
        }
        Ok(Err(PackError::Cancelled)) => PackUpdate::Cancelled { run },
        Ok(Err(e)) => failed(run, &e),
        Err(join_error) => failed(run, &PackError::from(join_error)),
    };

    let _ = update_tx.send(update);
}

fn spawn_job(
    run: RunId,
    request: PackRequest,
    cancel: CancelToken,
    update_tx: mpsc::UnboundedSender<PackUpdate>,
) -> JoinHandle<pack_engine::Result<pack_engine::PackedLayout>> {
    tokio::task::spawn_blocking(move || {
        let mut sink = |fraction: f64| {
            let _ = update_tx.send(PackUpdate::Progress { run, fraction });
        };
        pack_with_progress(
            &request.boxes,
            &request.container,
            &request.options,
            &mut sink,
            &cancel,
        )
    })
}

fn failed(run: RunId, error: &PackError) -> PackUpdate {
    log::error!("{:?} failed: {}", run, error);
    PackUpdate::Failed {
        run,
        failure: PackFailure::from(error),
    }
}

/// Caller side of the worker channels
pub struct PackerHandle {
    command_tx: mpsc::UnboundedSender<PackCommand>,
    update_rx: mpsc::UnboundedReceiver<PackUpdate>,
    next_run: u64,
}

impl PackerHandle {
    /// Submit a run. The request is moved into the worker as-is.
    pub fn start(&mut self, request: PackRequest) -> Result<RunId, RuntimeError> {
        self.next_run += 1;
        let run = RunId(self.next_run);
        self.command_tx
            .send(PackCommand::Start { run, request })
            .map_err(|_| RuntimeError::WorkerStopped)?;
        Ok(run)
    }

    pub fn cancel(&self, run: RunId) -> Result<(), RuntimeError> {
        self.command_tx
            .send(PackCommand::Cancel { run })
            .map_err(|_| RuntimeError::WorkerStopped)
    }

    /// Next update from the worker; `None` once the worker has exited
    pub async fn next_update(&mut self) -> Option<PackUpdate> {
        self.update_rx.recv().await
    }
}

/// Spawn the worker on the current tokio runtime
pub fn spawn_worker() -> PackerHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();

    tokio::spawn(worker_task(command_rx, update_tx));

    PackerHandle {
        command_tx,
        update_rx,
        next_run: 0,
    }
}
