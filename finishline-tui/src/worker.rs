//! Background worker thread. Results loading (file reads, HTTP fetches with
//! retries) runs here so the UI keeps drawing.
//!
//! Communication with the TUI main thread is via `mpsc` channels.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use finishline_core::data::{self, DataSource, IngestReport};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Load { source: DataSource },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Loaded { report: Box<IngestReport> },
    LoadFailed { source: String, error: String },
}

/// Spawn the worker thread. It exits on `Shutdown` or when either channel
/// closes.
pub fn spawn_worker(
    cmd_rx: Receiver<WorkerCommand>,
    resp_tx: Sender<WorkerResponse>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("finishline-worker".into())
        .spawn(move || worker_loop(cmd_rx, resp_tx))
}

fn worker_loop(cmd_rx: Receiver<WorkerCommand>, resp_tx: Sender<WorkerResponse>) {
    info!("worker started");
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            WorkerCommand::Load { source } => {
                if resp_tx.send(handle_load(&source)).is_err() {
                    break;
                }
            }
            WorkerCommand::Shutdown => break,
        }
    }
    info!("worker stopped");
}

fn handle_load(source: &DataSource) -> WorkerResponse {
    debug!(%source, "loading results");
    match data::load(source) {
        Ok(report) => WorkerResponse::Loaded {
            report: Box::new(report),
        },
        Err(e) => WorkerResponse::LoadFailed {
            source: source.to_string(),
            error: e.to_string(),
        },
    }
}
