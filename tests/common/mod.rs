// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test doubles: a scriptable identity provider, a recording
//! notifier, and an in-memory local cache.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskmanager_sync::error::{AppError, AuthErrorCode, Result};
use taskmanager_sync::local::LocalCache;
use taskmanager_sync::models::Identity;
use taskmanager_sync::notify::{Notifier, Severity};
use taskmanager_sync::services::{AuthService, IdentityProvider};

#[allow(dead_code)]
pub fn test_identity(id: &str, email: &str) -> Identity {
    Identity {
        id: id.to_string(),
        email: Some(email.to_string()),
        display_name: None,
        avatar_url: None,
    }
}

/// Scriptable identity provider.
pub struct FakeProvider {
    ready: AtomicBool,
    identity: Identity,
    fail_code: Mutex<Option<AuthErrorCode>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeProvider {
    pub fn ready(identity: Identity) -> Self {
        Self {
            ready: AtomicBool::new(true),
            identity,
            fail_code: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn not_ready(identity: Identity) -> Self {
        let provider = Self::ready(identity);
        provider.ready.store(false, Ordering::SeqCst);
        provider
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Make every subsequent sign-in/sign-up attempt fail with `code`.
    pub fn fail_with(&self, code: AuthErrorCode) {
        *self.fail_code.lock().unwrap() = Some(code);
    }

    /// Number of sign-in/sign-up attempts that reached the adapter.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn attempt(&self) -> Result<Identity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_code.lock().unwrap().clone() {
            Some(code) => Err(AppError::Auth(code)),
            None => Ok(self.identity.clone()),
        }
    }
}

impl IdentityProvider for FakeProvider {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn restore_session(&self) -> Result<Option<Identity>> {
        Ok(None)
    }

    async fn sign_in_with_provider(&self) -> Result<Identity> {
        self.attempt()
    }

    async fn sign_in_with_password(&self, email: &str, _password: &str) -> Result<Identity> {
        self.attempt().map(|mut identity| {
            identity.email = Some(email.to_string());
            identity
        })
    }

    async fn sign_up_with_password(&self, email: &str, _password: &str) -> Result<Identity> {
        self.attempt().map(|mut identity| {
            identity.email = Some(email.to_string());
            identity
        })
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}

/// Notifier that records every message for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(String, Severity)>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn events(&self) -> Vec<(String, Severity)> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages_with(&self, severity: Severity) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, s)| *s == severity)
            .map(|(m, _)| m.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.events.lock().unwrap().push((message.to_string(), severity));
    }
}

/// In-memory [`LocalCache`] for migration tests.
#[derive(Default)]
pub struct MapCache {
    entries: HashMap<String, Value>,
}

#[allow(dead_code)]
impl MapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }
}

impl LocalCache for MapCache {
    fn get_json(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }
}

/// Auth service over a ready fake provider, initialized and signed in.
#[allow(dead_code)]
pub async fn signed_in_auth(
    identity: Identity,
) -> (AuthService<FakeProvider>, Arc<RecordingNotifier>) {
    let provider = Arc::new(FakeProvider::ready(identity));
    let notifier = Arc::new(RecordingNotifier::default());
    let auth = AuthService::new(provider, notifier.clone(), Duration::from_millis(500));
    auth.initialize().await.expect("auth should initialize");
    auth.sign_in_with_password("a@x.com", "secret123")
        .await
        .expect("sign-in should succeed");
    (auth, notifier)
}
