use std::future::Future;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::models::{ClearOutcome, DatabaseInfo, Location, Machine, Stats};

/// A finished background fetch, delivered to the UI thread. Sequence
/// numbers travel with the result so the state layer can drop stale
/// responses.
pub enum Event {
    Locations {
        seq: u64,
        result: Result<Vec<Location>, String>,
    },
    Machines {
        seq: u64,
        result: Result<Vec<Machine>, String>,
    },
    Stats {
        seq: u64,
        result: Result<Stats, String>,
    },
    AdminMachines {
        seq: u64,
        result: Result<Vec<Machine>, String>,
    },
    DatabaseInfo {
        seq: u64,
        result: Result<DatabaseInfo, String>,
    },
    Cleared {
        result: Result<ClearOutcome, String>,
    },
}

/// Fans API calls out onto the tokio runtime and funnels their results
/// back over a channel. Only `ViewerApp::update` ever drains the channel,
/// so all state mutation stays on the UI thread.
pub struct Jobs {
    handle: tokio::runtime::Handle,
    tx: Sender<Event>,
}

impl Jobs {
    pub fn new(handle: tokio::runtime::Handle) -> (Self, Receiver<Event>) {
        let (tx, rx) = channel();
        (Self { handle, tx }, rx)
    }

    /// Run a fetch in the background and wake the UI when it resolves.
    /// Discarding the receiver side is the only cancellation there is.
    pub fn spawn<F>(&self, ctx: &egui::Context, fut: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.handle.spawn(async move {
            let event = fut.await;
            if tx.send(event).is_ok() {
                ctx.request_repaint();
            }
        });
    }
}
