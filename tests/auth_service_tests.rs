// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth facade behavior: readiness, listener propagation, error mapping.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskmanager_sync::error::{AppError, AuthErrorCode};
use taskmanager_sync::notify::Severity;
use taskmanager_sync::services::AuthService;

mod common;
use common::{test_identity, FakeProvider, RecordingNotifier};

fn service(
    provider: FakeProvider,
    wait: Duration,
) -> (AuthService<FakeProvider>, Arc<FakeProvider>, Arc<RecordingNotifier>) {
    let provider = Arc::new(provider);
    let notifier = Arc::new(RecordingNotifier::default());
    let auth = AuthService::new(provider.clone(), notifier.clone(), wait);
    (auth, provider, notifier)
}

#[tokio::test]
async fn test_initialize_notifies_listeners_with_absent_identity() {
    let (auth, _, _) =
        service(FakeProvider::ready(test_identity("u1", "a@x.com")), Duration::from_millis(500));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    auth.subscribe(move |identity| {
        seen_clone.lock().unwrap().push(identity.map(|i| i.id.clone()));
    });

    // Not ready yet: subscribing must not fire.
    assert!(seen.lock().unwrap().is_empty());

    auth.initialize().await.unwrap();

    assert_eq!(seen.lock().unwrap().as_slice(), &[None]);
    assert!(!auth.is_signed_in());
}

#[tokio::test]
async fn test_subscribe_after_ready_fires_immediately() {
    let (auth, _, _) =
        service(FakeProvider::ready(test_identity("u1", "a@x.com")), Duration::from_millis(500));
    auth.initialize().await.unwrap();
    auth.sign_in_with_password("a@x.com", "secret123").await.unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    auth.subscribe(move |identity| {
        seen_clone.lock().unwrap().push(identity.map(|i| i.id.clone()));
    });

    assert_eq!(seen.lock().unwrap().as_slice(), &[Some("u1".to_string())]);
}

#[tokio::test]
async fn test_initialize_times_out_when_adapter_never_ready() {
    let (auth, _, _) = service(
        FakeProvider::not_ready(test_identity("u1", "a@x.com")),
        Duration::from_millis(250),
    );

    match auth.initialize().await {
        Err(AppError::AdapterUnavailable(ms)) => assert_eq!(ms, 250),
        other => panic!("expected AdapterUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_provider_sign_in_requires_readiness() {
    let (auth, _, _) = service(
        FakeProvider::ready(test_identity("u1", "a@x.com")),
        Duration::from_millis(250),
    );

    // initialize() was never called, so the facade never became ready.
    let result = auth.sign_in_with_provider().await;
    assert!(matches!(result, Err(AppError::AdapterUnavailable(_))));
}

#[tokio::test]
async fn test_sign_in_notifies_listeners_before_returning() {
    let (auth, _, notifier) =
        service(FakeProvider::ready(test_identity("u1", "a@x.com")), Duration::from_millis(500));
    auth.initialize().await.unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    auth.subscribe(move |identity| {
        seen_clone.lock().unwrap().push(identity.map(|i| i.id.clone()));
    });

    let identity = auth.sign_in_with_password("a@x.com", "secret123").await.unwrap();

    assert_eq!(identity.id, "u1");
    assert_eq!(identity.email.as_deref(), Some("a@x.com"));
    // Initial (absent) notification, then the signed-in one.
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[None, Some("u1".to_string())]
    );
    assert_eq!(
        notifier.messages_with(Severity::Success),
        vec!["Welcome a@x.com!".to_string()]
    );
    assert!(auth.is_signed_in());
}

#[tokio::test]
async fn test_listener_panic_does_not_block_other_listeners() {
    let (auth, _, _) =
        service(FakeProvider::ready(test_identity("u1", "a@x.com")), Duration::from_millis(500));
    auth.initialize().await.unwrap();

    auth.subscribe(|identity| {
        if identity.is_some() {
            panic!("faulty subscriber");
        }
    });

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    auth.subscribe(move |identity| {
        seen_clone.lock().unwrap().push(identity.map(|i| i.id.clone()));
    });

    auth.sign_in_with_password("a@x.com", "secret123").await.unwrap();

    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[None, Some("u1".to_string())]
    );
}

#[tokio::test]
async fn test_sign_in_failure_is_translated_notified_and_rethrown() {
    let (auth, provider, notifier) =
        service(FakeProvider::ready(test_identity("u1", "a@x.com")), Duration::from_millis(500));
    auth.initialize().await.unwrap();
    provider.fail_with(AuthErrorCode::WrongPassword);

    let result = auth.sign_in_with_password("a@x.com", "nope").await;

    assert!(matches!(result, Err(AppError::Auth(AuthErrorCode::WrongPassword))));
    assert_eq!(
        notifier.messages_with(Severity::Error),
        vec!["Incorrect password!".to_string()]
    );
    assert!(!auth.is_signed_in());
}

#[tokio::test]
async fn test_sign_up_rejects_weak_password_locally() {
    let (auth, provider, notifier) =
        service(FakeProvider::ready(test_identity("u1", "a@x.com")), Duration::from_millis(500));
    auth.initialize().await.unwrap();

    let result = auth.sign_up_with_password("a@x.com", "short", "short").await;

    assert!(matches!(result, Err(AppError::Auth(AuthErrorCode::WeakPassword))));
    assert_eq!(provider.call_count(), 0, "adapter must not be called");
    assert_eq!(
        notifier.messages_with(Severity::Error),
        vec![AuthErrorCode::WeakPassword.user_message()]
    );
}

#[tokio::test]
async fn test_sign_up_rejects_confirmation_mismatch_locally() {
    let (auth, provider, _) =
        service(FakeProvider::ready(test_identity("u1", "a@x.com")), Duration::from_millis(500));
    auth.initialize().await.unwrap();

    let result = auth
        .sign_up_with_password("a@x.com", "secret123", "secret124")
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_sign_out_clears_identity_and_notifies_absent() {
    let (auth, _, notifier) =
        service(FakeProvider::ready(test_identity("u1", "a@x.com")), Duration::from_millis(500));
    auth.initialize().await.unwrap();
    auth.sign_in_with_password("a@x.com", "secret123").await.unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    auth.subscribe(move |identity| {
        seen_clone.lock().unwrap().push(identity.map(|i| i.id.clone()));
    });

    auth.sign_out().await.unwrap();

    assert!(!auth.is_signed_in());
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[Some("u1".to_string()), None]
    );
    assert!(notifier
        .messages_with(Severity::Success)
        .contains(&"Signed out!".to_string()));
}
