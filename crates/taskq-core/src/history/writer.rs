//! Background task that serializes appends to the history log.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{HistoryError, HistoryItem, HistoryStore};

enum Command {
    Append(Box<HistoryItem>),
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget handle to the history worker. Cheap to clone.
#[derive(Clone, Debug)]
pub struct HistoryWriter {
    tx: mpsc::Sender<Command>,
}

impl HistoryWriter {
    /// Spawn the worker on the current Tokio runtime. The worker exits once
    /// every `HistoryWriter` clone has been dropped; await the handle to make
    /// sure queued records reached disk.
    pub fn spawn(store: HistoryStore, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_history_worker(Arc::new(store), rx));
        (Self { tx }, handle)
    }

    /// Queue a record without waiting. Safe to call from any thread, inside
    /// or outside the runtime. A full queue or a stopped worker drops the
    /// record with a warning.
    pub fn append(&self, item: HistoryItem) {
        match self.tx.try_send(Command::Append(Box::new(item))) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("history queue full; record dropped")
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("history writer closed; record dropped")
            }
        }
    }

    /// Resolve once every record queued before this call has been processed.
    pub async fn flush(&self) -> Result<(), HistoryError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack_tx))
            .await
            .map_err(|_| HistoryError::WriterClosed)?;
        ack_rx.await.map_err(|_| HistoryError::WriterClosed)
    }
}

async fn run_history_worker(store: Arc<HistoryStore>, mut rx: mpsc::Receiver<Command>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Append(item) => {
                let store = Arc::clone(&store);
                let name = item.file_name.clone();
                match tokio::task::spawn_blocking(move || store.append(&item)).await {
                    Ok(Ok(())) => tracing::debug!(file = %name, "history record appended"),
                    Ok(Err(e)) => tracing::warn!(file = %name, "history append failed: {}", e),
                    Err(e) => tracing::warn!(file = %name, "history append task join: {}", e),
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("history worker stopped");
}
