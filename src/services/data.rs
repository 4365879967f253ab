// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data facade: typed save/load over the per-user document.
//!
//! Every operation is gated on an authenticated identity. Persistence
//! failures never escape this boundary for save/load: they are logged,
//! surfaced as a notification, and converted to the documented default so UI
//! flows degrade to "no data" instead of crashing. `NotAuthenticated` is the
//! exception — it is always an error, raised before any store call.

use crate::db::{DocumentStore, DocumentWatch};
use crate::error::{AppError, Result};
use crate::local::{keys, LocalCache};
use crate::models::{Identity, TimeBlocksData, UserDocument};
use crate::notify::{Notifier, Severity};
use crate::services::auth::AuthHandle;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Version tag written into backup files.
const BACKUP_VERSION: &str = "1.0";

/// Data facade over a [`DocumentStore`].
pub struct DataService<S> {
    auth: AuthHandle,
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
}

impl<S: DocumentStore> DataService<S> {
    pub fn new(auth: AuthHandle, store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            auth,
            store,
            notifier,
        }
    }

    /// The single admission-control rule: no identity, no data access.
    fn require_auth(&self) -> Result<Identity> {
        self.auth
            .current_identity()
            .ok_or(AppError::NotAuthenticated)
    }

    // ─── Save Operations ─────────────────────────────────────────

    pub async fn save_todos(&self, todos: &[Value]) -> Result<bool> {
        let patch = UserDocument {
            todos: Some(todos.to_vec()),
            ..Default::default()
        };
        self.save_patch(patch, "todos", Some("Could not save todos!"))
            .await
    }

    pub async fn save_events(&self, events: &[Value]) -> Result<bool> {
        let patch = UserDocument {
            events: Some(events.to_vec()),
            ..Default::default()
        };
        self.save_patch(patch, "events", Some("Could not save events!"))
            .await
    }

    /// Time blocks and their settings are saved as one unit.
    pub async fn save_time_blocks(
        &self,
        time_blocks: &[Value],
        settings: &Map<String, Value>,
    ) -> Result<bool> {
        let patch = UserDocument {
            time_blocks: Some(time_blocks.to_vec()),
            time_block_settings: Some(settings.clone()),
            ..Default::default()
        };
        self.save_patch(patch, "time blocks", Some("Could not save time blocks!"))
            .await
    }

    /// Timer state saves are quiet: no user notification on failure.
    pub async fn save_pomodoro_state(&self, state: &Value) -> Result<bool> {
        let patch = UserDocument {
            pomodoro_state: Some(state.clone()),
            ..Default::default()
        };
        self.save_patch(patch, "pomodoro state", None).await
    }

    /// Merge-write the patch plus a fresh `updatedAt`.
    async fn save_patch(
        &self,
        mut patch: UserDocument,
        label: &str,
        failure_message: Option<&str>,
    ) -> Result<bool> {
        let identity = self.require_auth()?;
        patch.updated_at = Some(now_rfc3339());

        match self.store.merge(&identity.id, &patch).await {
            Ok(()) => {
                tracing::debug!(user_id = %identity.id, label, "Saved to document store");
                Ok(true)
            }
            Err(err) => {
                tracing::error!(user_id = %identity.id, label, error = %err, "Save failed");
                if let Some(message) = failure_message {
                    self.notifier.notify(message, Severity::Error);
                }
                Ok(false)
            }
        }
    }

    // ─── Load Operations ─────────────────────────────────────────

    pub async fn load_todos(&self) -> Result<Vec<Value>> {
        let doc = self
            .load_document("todos", Some("Could not load todos!"))
            .await?;
        Ok(doc.and_then(|d| d.todos).unwrap_or_default())
    }

    pub async fn load_events(&self) -> Result<Vec<Value>> {
        let doc = self
            .load_document("events", Some("Could not load events!"))
            .await?;
        Ok(doc.and_then(|d| d.events).unwrap_or_default())
    }

    pub async fn load_time_blocks(&self) -> Result<TimeBlocksData> {
        let doc = self
            .load_document("time blocks", Some("Could not load time blocks!"))
            .await?;
        Ok(match doc {
            Some(doc) => TimeBlocksData {
                time_blocks: doc.time_blocks.unwrap_or_default(),
                settings: doc.time_block_settings.unwrap_or_default(),
            },
            None => TimeBlocksData::default(),
        })
    }

    pub async fn load_pomodoro_state(&self) -> Result<Option<Value>> {
        let doc = self.load_document("pomodoro state", None).await?;
        Ok(doc.and_then(|d| d.pomodoro_state))
    }

    /// Read the document; store failures degrade to `None` after logging
    /// and (optionally) notifying.
    async fn load_document(
        &self,
        label: &str,
        failure_message: Option<&str>,
    ) -> Result<Option<UserDocument>> {
        let identity = self.require_auth()?;

        match self.store.get(&identity.id).await {
            Ok(doc) => Ok(doc),
            Err(err) => {
                tracing::error!(user_id = %identity.id, label, error = %err, "Load failed");
                if let Some(message) = failure_message {
                    self.notifier.notify(message, Severity::Error);
                }
                Ok(None)
            }
        }
    }

    // ─── Real-Time Subscription ──────────────────────────────────

    /// Forward real-time document changes from the store.
    ///
    /// Returns `None` when not authenticated or when the store refuses the
    /// subscription.
    pub async fn subscribe_to_document(&self) -> Option<DocumentWatch> {
        let identity = self.auth.current_identity()?;
        match self.store.watch(&identity.id).await {
            Ok(watch) => Some(watch),
            Err(err) => {
                tracing::error!(user_id = %identity.id, error = %err, "Document subscription failed");
                None
            }
        }
    }

    // ─── Migration ───────────────────────────────────────────────

    /// One-shot migration of locally cached data into the cloud document.
    ///
    /// Returns `false` when there is nothing to migrate, and also when the
    /// remote document already holds todos or events — migration never
    /// overwrites existing remote data, so running it twice writes at most
    /// once.
    pub async fn migrate_local_data(&self, cache: &impl LocalCache) -> Result<bool> {
        let identity = self.require_auth()?;

        let todos = as_array(cache.get_json(keys::TODOS));
        let events = as_array(cache.get_json(keys::EVENTS));
        let time_blocks = as_array(cache.get_json(keys::TIME_BLOCKS));
        let settings = as_object(cache.get_json(keys::TIME_BLOCK_SETTINGS));

        if todos.is_empty() && events.is_empty() && time_blocks.is_empty() {
            tracing::info!(user_id = %identity.id, "No local data to migrate");
            return Ok(false);
        }

        let existing = match self.store.get(&identity.id).await {
            Ok(existing) => existing,
            Err(err) => {
                tracing::error!(user_id = %identity.id, error = %err, "Migration read failed");
                self.notifier.notify("Error migrating data!", Severity::Error);
                return Ok(false);
            }
        };

        if existing.as_ref().is_some_and(UserDocument::has_primary_data) {
            tracing::info!(user_id = %identity.id, "Remote document already has data, skipping migration");
            return Ok(false);
        }

        let now = now_rfc3339();
        let doc = UserDocument {
            todos: Some(todos),
            events: Some(events),
            time_blocks: Some(time_blocks),
            time_block_settings: Some(settings),
            pomodoro_state: None,
            updated_at: Some(now.clone()),
            migrated_at: Some(now),
        };

        match self.store.replace(&identity.id, &doc).await {
            Ok(()) => {
                tracing::info!(user_id = %identity.id, "Migration complete");
                self.notifier
                    .notify("Moved offline data to the cloud!", Severity::Success);
                Ok(true)
            }
            Err(err) => {
                tracing::error!(user_id = %identity.id, error = %err, "Migration write failed");
                self.notifier.notify("Error migrating data!", Severity::Error);
                Ok(false)
            }
        }
    }

    // ─── Backup ──────────────────────────────────────────────────

    /// Export the full document as a backup file under `dir`.
    pub async fn create_backup(&self, dir: &Path) -> Result<bool> {
        let identity = self.require_auth()?;

        let doc = match self.store.get(&identity.id).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                self.notifier.notify("No data to back up!", Severity::Warning);
                return Ok(false);
            }
            Err(err) => {
                tracing::error!(user_id = %identity.id, error = %err, "Backup read failed");
                self.notifier
                    .notify("Could not create backup!", Severity::Error);
                return Ok(false);
            }
        };

        match write_backup_file(dir, &doc) {
            Ok(path) => {
                tracing::info!(user_id = %identity.id, path = %path.display(), "Backup created");
                self.notifier.notify("Backup file created!", Severity::Success);
                Ok(true)
            }
            Err(err) => {
                tracing::error!(user_id = %identity.id, error = %err, "Backup write failed");
                self.notifier
                    .notify("Could not create backup!", Severity::Error);
                Ok(false)
            }
        }
    }
}

/// Write `taskmanager-backup-<date>.json`: the document fields plus a backup
/// timestamp and version tag.
fn write_backup_file(dir: &Path, doc: &UserDocument) -> anyhow::Result<PathBuf> {
    let now = chrono::Utc::now();

    let mut backup = match serde_json::to_value(doc)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    backup.insert("backupDate".to_string(), Value::String(now.to_rfc3339()));
    backup.insert(
        "version".to_string(),
        Value::String(BACKUP_VERSION.to_string()),
    );

    let file_name = format!("taskmanager-backup-{}.json", now.format("%Y-%m-%d"));
    let path = dir.join(file_name);
    std::fs::write(&path, serde_json::to_vec_pretty(&Value::Object(backup))?)?;
    Ok(path)
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn as_array(value: Option<Value>) -> Vec<Value> {
    value
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
}

fn as_object(value: Option<Value>) -> Map<String, Value> {
    value
        .and_then(|v| v.as_object().cloned())
        .unwrap_or_default()
}
