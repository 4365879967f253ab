//! Document store layer.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::UserDocument;

/// Collection names as constants.
pub mod collections {
    /// Per-user documents, keyed by the provider-issued user id
    pub const USERS: &str = "users";
}

/// Storage backend for per-user documents.
///
/// One document per user id. `merge` touches only the populated patch
/// fields; `replace` writes the whole document (used by migration, which has
/// already verified the remote side is empty).
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync {
    /// Fetch the user's document, or `None` if it was never created.
    async fn get(&self, user_id: &str) -> Result<Option<UserDocument>>;

    /// Field-level merge-write of the populated patch fields.
    async fn merge(&self, user_id: &str, patch: &UserDocument) -> Result<()>;

    /// Full write of the document.
    async fn replace(&self, user_id: &str, doc: &UserDocument) -> Result<()>;

    /// Subscribe to real-time changes of the user's document.
    async fn watch(&self, user_id: &str) -> Result<DocumentWatch>;
}

/// Handle for a real-time document subscription.
///
/// Dropping the handle unsubscribes; [`DocumentWatch::stop`] does so
/// gracefully, letting the backend listener shut down first.
pub struct DocumentWatch {
    rx: tokio::sync::mpsc::UnboundedReceiver<UserDocument>,
    stop_tx: Option<tokio::sync::oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl DocumentWatch {
    /// Watch backed by a plain channel (in-memory store).
    pub(crate) fn from_channel(rx: tokio::sync::mpsc::UnboundedReceiver<UserDocument>) -> Self {
        Self {
            rx,
            stop_tx: None,
            task: None,
        }
    }

    /// Watch backed by a background listener task (Firestore).
    pub(crate) fn with_task(
        rx: tokio::sync::mpsc::UnboundedReceiver<UserDocument>,
        stop_tx: tokio::sync::oneshot::Sender<()>,
        task: tokio::task::JoinHandle<()>,
    ) -> Self {
        Self {
            rx,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    /// Next document snapshot, or `None` once the subscription has ended.
    pub async fn next_change(&mut self) -> Option<UserDocument> {
        self.rx.recv().await
    }

    /// Unsubscribe and wait for the backend listener to wind down.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for DocumentWatch {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
