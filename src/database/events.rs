use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::database::models::Workspace;
use crate::database::store::WorkspaceStream;

const CHANNEL_CAPACITY: usize = 64;

/// In-process fan-out of saved workspace documents, one broadcast channel
/// per workspace id.
///
/// Only writes made through this process are observed.
#[derive(Clone, Default)]
pub struct WorkspaceEvents {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<Workspace>>>>,
}

impl WorkspaceEvents {
    pub fn new() -> Self {
        Self::default()
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<Workspace>>> {
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Delivers to current subscribers. A channel whose subscribers are all
    /// gone is dropped.
    pub fn publish(&self, workspace: &Workspace) {
        let mut channels = self.channels();
        let Some(tx) = channels.get(&workspace.id) else {
            return;
        };

        if tx.send(workspace.clone()).is_err() || tx.receiver_count() == 0 {
            channels.remove(&workspace.id);
        }
    }

    pub fn subscribe(&self, workspace_id: &str) -> WorkspaceStream {
        let rx = self
            .channels()
            .entry(workspace_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        // A lagged receiver drops the missed snapshots; the next one it sees
        // is a complete document anyway.
        let stream = BroadcastStream::new(rx).filter_map(|result| result.ok());

        Box::pin(stream)
    }
}
