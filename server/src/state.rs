//! Shared application state for the HTTP server.

use std::sync::Arc;

use hpg_engine::HourglassGraph;
use hpg_store::{FsBackend, Gateway, Store};
use tokio::sync::broadcast;
use tracing::trace;

pub type DatasetStore = Store<HourglassGraph, FsBackend>;
pub type DatasetGateway = Gateway<HourglassGraph, FsBackend>;

/// Events broadcast to SSE clients after a dataset changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    DatasetCreated { name: String },
    DatasetUpdated { name: String },
    DatasetDeleted { name: String },
}

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: DatasetGateway,
    /// Broadcast sender for dataset change events.
    pub event_tx: Arc<broadcast::Sender<ChangeEvent>>,
}

impl AppState {
    pub fn new(store: Arc<DatasetStore>, event_buffer: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_buffer);
        Self {
            gateway: Gateway::new(store),
            event_tx: Arc::new(event_tx),
        }
    }

    /// Broadcast `event`. Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        if self.event_tx.send(event).is_err() {
            trace!("no SSE subscribers");
        }
    }
}
