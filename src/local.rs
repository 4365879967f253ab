// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local cache collaborator (read-only source for the one-time migration).

use anyhow::Context;
use serde_json::Value;
use std::path::Path;

/// Keys used by the pre-cloud local storage.
pub mod keys {
    pub const TODOS: &str = "todos";
    pub const EVENTS: &str = "calendar-events";
    pub const TIME_BLOCKS: &str = "time-blocks";
    pub const TIME_BLOCK_SETTINGS: &str = "time-blocks-settings";
}

/// Keyed JSON storage, read-only from this layer's perspective.
pub trait LocalCache {
    /// JSON-decoded value for `key`, or `None` when absent.
    fn get_json(&self, key: &str) -> Option<Value>;
}

/// Local cache backed by a JSON export file (one top-level object, keys as
/// stored by the browser's local storage).
pub struct JsonFileCache {
    entries: serde_json::Map<String, Value>,
}

impl JsonFileCache {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading local export {}", path.display()))?;
        let entries = serde_json::from_str(&raw)
            .with_context(|| format!("local export {} is not a JSON object", path.display()))?;
        Ok(Self { entries })
    }
}

impl LocalCache for JsonFileCache {
    fn get_json(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }
}

/// Empty cache (no local data to migrate).
pub struct EmptyCache;

impl LocalCache for EmptyCache {
    fn get_json(&self, _key: &str) -> Option<Value> {
        None
    }
}
