//! Async task management for non-blocking API operations.
//!
//! Network calls run in background tokio tasks while the UI keeps rendering.
//! Results come back to the main loop as `ApiMessage`s over an unbounded
//! channel, which the loop drains with `try_recv()` on every tick.
//!
//! Every message carries the `MountId` of the table that issued the request.
//! When a table is torn down (e.g. the user switches entity), its id is
//! retired and late results addressed to it are dropped instead of being
//! applied to a table that no longer exists.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::{ApiError, RecordStore};
use crate::record::{Record, RecordId};

/// Identifies one mounted table instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountId(pub u64);

/// Messages sent from background tasks to the main event loop.
#[derive(Debug)]
pub enum ApiMessage {
    /// Result of a list fetch.
    RecordsLoaded {
        mount: MountId,
        result: Result<Vec<Record>, ApiError>,
    },

    /// Result of a PATCH.
    RecordSaved {
        mount: MountId,
        id: RecordId,
        result: Result<Record, ApiError>,
    },

    /// Result of a DELETE.
    RecordDeleted {
        mount: MountId,
        id: RecordId,
        result: Result<(), ApiError>,
    },
}

impl ApiMessage {
    /// The table this message is addressed to.
    pub fn mount(&self) -> MountId {
        match self {
            ApiMessage::RecordsLoaded { mount, .. }
            | ApiMessage::RecordSaved { mount, .. }
            | ApiMessage::RecordDeleted { mount, .. } => *mount,
        }
    }
}

/// A request the App wants executed against an entity's store.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    /// GET the collection.
    Load,
    /// PATCH one record.
    Save { id: RecordId, patch: Record },
    /// DELETE one record.
    Delete { id: RecordId },
}

/// A request addressed to a mounted table of a named entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    /// The entity whose store should run the request.
    pub entity: String,
    /// The table that will receive the result.
    pub mount: MountId,
    /// What to do.
    pub request: ApiRequest,
}

/// Spawns background tasks for async operations.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Run `request` against `store` in the background.
    pub fn spawn(&self, store: Arc<dyn RecordStore>, mount: MountId, request: ApiRequest) {
        match request {
            ApiRequest::Load => self.spawn_load(store, mount),
            ApiRequest::Save { id, patch } => self.spawn_save(store, mount, id, patch),
            ApiRequest::Delete { id } => self.spawn_delete(store, mount, id),
        }
    }

    /// Spawn a task to fetch the collection.
    pub fn spawn_load(&self, store: Arc<dyn RecordStore>, mount: MountId) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = store.list().await;
            if tx.send(ApiMessage::RecordsLoaded { mount, result }).is_err() {
                debug!("Event loop gone, dropping list result");
            }
        });
    }

    /// Spawn a task to PATCH a record.
    pub fn spawn_save(&self, store: Arc<dyn RecordStore>, mount: MountId, id: RecordId, patch: Record) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = store.update(id, &patch).await;
            if tx.send(ApiMessage::RecordSaved { mount, id, result }).is_err() {
                debug!(%id, "Event loop gone, dropping save result");
            }
        });
    }

    /// Spawn a task to DELETE a record.
    pub fn spawn_delete(&self, store: Arc<dyn RecordStore>, mount: MountId, id: RecordId) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = store.remove(id).await;
            if tx.send(ApiMessage::RecordDeleted { mount, id, result }).is_err() {
                debug!(%id, "Event loop gone, dropping delete result");
            }
        });
    }
}

/// Create a new task channel and spawner.
///
/// Returns a tuple of (receiver, spawner). The receiver should be polled
/// in the main event loop, and the spawner should be used to spawn tasks.
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}
