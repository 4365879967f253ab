// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The per-user document stored in Firestore.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The single per-user document holding all persisted application data.
///
/// Every field is optional: the document is created lazily on first save and
/// each category lives independently of its siblings. The same struct doubles
/// as a merge patch — a partially populated value describes exactly the
/// fields a merge-write touches (see [`UserDocument::set_fields`]).
///
/// Payload items (todos, events, time blocks, timer state) are opaque
/// JSON blobs owned by the UI; this layer never looks inside them.
/// Timestamps are RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todos: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_blocks: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_block_settings: Option<Map<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pomodoro_state: Option<Value>,

    /// Last write timestamp (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Set once by the local-data migration (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<String>,
}

impl UserDocument {
    /// Wire-format paths of the populated fields, for merge-write masks.
    pub fn set_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.todos.is_some() {
            fields.push("todos");
        }
        if self.events.is_some() {
            fields.push("events");
        }
        if self.time_blocks.is_some() {
            fields.push("timeBlocks");
        }
        if self.time_block_settings.is_some() {
            fields.push("timeBlockSettings");
        }
        if self.pomodoro_state.is_some() {
            fields.push("pomodoroState");
        }
        if self.updated_at.is_some() {
            fields.push("updatedAt");
        }
        if self.migrated_at.is_some() {
            fields.push("migratedAt");
        }
        fields
    }

    /// Merge a patch into this document.
    ///
    /// Only populated patch fields are applied; absent fields never disturb
    /// their siblings. This is the merge-write invariant the in-memory store
    /// shares with Firestore's field-mask update.
    pub fn apply(&mut self, patch: &UserDocument) {
        if let Some(todos) = &patch.todos {
            self.todos = Some(todos.clone());
        }
        if let Some(events) = &patch.events {
            self.events = Some(events.clone());
        }
        if let Some(blocks) = &patch.time_blocks {
            self.time_blocks = Some(blocks.clone());
        }
        if let Some(settings) = &patch.time_block_settings {
            self.time_block_settings = Some(settings.clone());
        }
        if let Some(state) = &patch.pomodoro_state {
            self.pomodoro_state = Some(state.clone());
        }
        if let Some(updated_at) = &patch.updated_at {
            self.updated_at = Some(updated_at.clone());
        }
        if let Some(migrated_at) = &patch.migrated_at {
            self.migrated_at = Some(migrated_at.clone());
        }
    }

    /// True when the document holds existing todos or events.
    ///
    /// The migration guard keys off exactly these two fields: a remote
    /// document with either populated must never be overwritten.
    pub fn has_primary_data(&self) -> bool {
        let non_empty = |v: &Option<Vec<Value>>| v.as_ref().is_some_and(|s| !s.is_empty());
        non_empty(&self.todos) || non_empty(&self.events)
    }
}

/// Time blocks together with their settings, loaded as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeBlocksData {
    pub time_blocks: Vec<Value>,
    pub settings: Map<String, Value>,
}
