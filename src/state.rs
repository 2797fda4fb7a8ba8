use crate::models::AppData;
use crate::notify::Notifier;
use crate::storage::persist_data;
use crate::store::AttendanceStore;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<AttendanceStore>>,
    pub notifier: Arc<dyn Notifier>,
    snapshots: Arc<watch::Sender<AppData>>,
}

impl AppState {
    /// Spawns the background writer, so this must run inside a tokio runtime.
    pub fn new(data_path: PathBuf, data: AppData, notifier: Arc<dyn Notifier>) -> Self {
        let (snapshots, receiver) = watch::channel(data.clone());
        tokio::spawn(write_snapshots(data_path, receiver));

        Self {
            store: Arc::new(Mutex::new(AttendanceStore::new(data))),
            notifier,
            snapshots: Arc::new(snapshots),
        }
    }

    /// Applies `change` under the store lock, then hands the new state to the
    /// writer without waiting for the write.
    pub async fn mutate<T>(&self, change: impl FnOnce(&mut AttendanceStore) -> T) -> T {
        let mut store = self.store.lock().await;
        let result = change(&mut store);
        let snapshot = store.snapshot();

        // Publish before releasing the lock so snapshots keep mutation order.
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
        drop(store);
        if self.snapshots.is_closed() {
            warn!("state writer stopped, changes will not be saved");
        }
        result
    }
}

/// Persists only the latest snapshot; older ones that queued up while a write
/// was in flight are skipped.
async fn write_snapshots(path: PathBuf, mut receiver: watch::Receiver<AppData>) {
    while receiver.changed().await.is_ok() {
        let data = receiver.borrow_and_update().clone();
        match persist_data(&path, &data).await {
            Ok(()) => debug!(path = %path.display(), "state saved"),
            Err(err) => error!("failed to save state: {err}"),
        }
    }
}
