// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store for tests and offline runs.
//!
//! Keeps a write log and a read counter so tests can assert things like
//! "migration ran the remote write at most once" or "no adapter call was
//! made before the auth guard fired", and supports failure injection to
//! exercise the facade's swallow-and-default error policy.

use crate::db::{DocumentStore, DocumentWatch};
use crate::error::{AppError, Result};
use crate::models::UserDocument;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// One recorded write operation.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOp {
    pub user_id: String,
    pub kind: WriteKind,
    pub fields: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Merge,
    Replace,
}

#[derive(Default)]
struct MemoryInner {
    docs: HashMap<String, UserDocument>,
    write_log: Vec<WriteOp>,
    reads: usize,
    watchers: HashMap<String, Vec<mpsc::UnboundedSender<UserDocument>>>,
}

/// In-process [`DocumentStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without going through the write log.
    pub fn insert_document(&self, user_id: &str, doc: UserDocument) {
        self.lock_inner().docs.insert(user_id.to_string(), doc);
    }

    /// Make subsequent reads fail with a persistence error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail with a persistence error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of reads attempted so far (including failed ones).
    pub fn read_count(&self) -> usize {
        self.lock_inner().reads
    }

    /// Snapshot of all successful writes, in order.
    pub fn write_log(&self) -> Vec<WriteOp> {
        self.lock_inner().write_log.clone()
    }

    /// Current stored document, bypassing the read counter.
    pub fn document(&self, user_id: &str) -> Option<UserDocument> {
        self.lock_inner().docs.get(user_id).cloned()
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify_watchers(inner: &mut MemoryInner, user_id: &str) {
        let Some(doc) = inner.docs.get(user_id).cloned() else {
            return;
        };
        if let Some(senders) = inner.watchers.get_mut(user_id) {
            senders.retain(|tx| tx.send(doc.clone()).is_ok());
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserDocument>> {
        let mut inner = self.lock_inner();
        inner.reads += 1;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("simulated read failure".to_string()));
        }
        Ok(inner.docs.get(user_id).cloned())
    }

    async fn merge(&self, user_id: &str, patch: &UserDocument) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("simulated write failure".to_string()));
        }
        let mut inner = self.lock_inner();
        inner
            .docs
            .entry(user_id.to_string())
            .or_default()
            .apply(patch);
        inner.write_log.push(WriteOp {
            user_id: user_id.to_string(),
            kind: WriteKind::Merge,
            fields: patch.set_fields(),
        });
        Self::notify_watchers(&mut inner, user_id);
        Ok(())
    }

    async fn replace(&self, user_id: &str, doc: &UserDocument) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("simulated write failure".to_string()));
        }
        let mut inner = self.lock_inner();
        inner.docs.insert(user_id.to_string(), doc.clone());
        inner.write_log.push(WriteOp {
            user_id: user_id.to_string(),
            kind: WriteKind::Replace,
            fields: doc.set_fields(),
        });
        Self::notify_watchers(&mut inner, user_id);
        Ok(())
    }

    async fn watch(&self, user_id: &str) -> Result<DocumentWatch> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock_inner();
        // Deliver the current state immediately, like a Firestore snapshot listener.
        if let Some(doc) = inner.docs.get(user_id) {
            let _ = tx.send(doc.clone());
        }
        inner
            .watchers
            .entry(user_id.to_string())
            .or_default()
            .push(tx);
        Ok(DocumentWatch::from_channel(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_merge_creates_document_lazily() {
        let store = MemoryStore::new();
        let patch = UserDocument {
            todos: Some(vec![json!({"id": 1})]),
            ..Default::default()
        };
        store.merge("u1", &patch).await.unwrap();

        let doc = store.get("u1").await.unwrap().unwrap();
        assert_eq!(doc.todos, Some(vec![json!({"id": 1})]));
        assert_eq!(store.write_log().len(), 1);
    }

    #[tokio::test]
    async fn test_watch_delivers_current_state_and_changes() {
        let store = MemoryStore::new();
        store.insert_document(
            "u1",
            UserDocument {
                todos: Some(vec![json!({"id": 1})]),
                ..Default::default()
            },
        );

        let mut watch = store.watch("u1").await.unwrap();
        let first = watch.next_change().await.unwrap();
        assert_eq!(first.todos, Some(vec![json!({"id": 1})]));

        let patch = UserDocument {
            events: Some(vec![json!({"title": "standup"})]),
            ..Default::default()
        };
        store.merge("u1", &patch).await.unwrap();

        let second = watch.next_change().await.unwrap();
        assert_eq!(second.events, Some(vec![json!({"title": "standup"})]));
        assert_eq!(second.todos, Some(vec![json!({"id": 1})]), "merge keeps siblings");
    }
}
