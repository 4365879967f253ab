// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth facade: identity lifecycle and auth-state propagation.
//!
//! Wraps an [`IdentityProvider`] adapter and owns the single in-memory
//! [`Identity`] value. Consumers subscribe for auth-state changes; the data
//! facade reads the identity through a cheap [`AuthHandle`] instead of a
//! global registry.

use crate::error::{AppError, AuthErrorCode, Result};
use crate::models::Identity;
use crate::notify::{Notifier, Severity};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

/// How often the readiness wait re-checks the adapter.
const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Identity provider adapter (sign-in, sign-up, sign-out, session restore).
///
/// Implementations report failures as [`AppError::Auth`] with the matching
/// [`AuthErrorCode`]; the facade handles translation and notification.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider: Send + Sync {
    /// Whether the adapter has finished its own initialization.
    fn is_ready(&self) -> bool;

    /// Resolve any persisted session. Called once, after readiness.
    async fn restore_session(&self) -> Result<Option<Identity>>;

    /// Federated (popup-driven) sign-in.
    async fn sign_in_with_provider(&self) -> Result<Identity>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity>;

    async fn sign_up_with_password(&self, email: &str, password: &str) -> Result<Identity>;

    async fn sign_out(&self) -> Result<()>;
}

type AuthListener = Box<dyn Fn(Option<&Identity>) + Send + Sync>;

/// Shared auth state: single writer (the facade), many readers.
#[derive(Default)]
struct AuthState {
    identity: RwLock<Option<Identity>>,
    ready: AtomicBool,
    listeners: Mutex<Vec<AuthListener>>,
}

impl AuthState {
    fn current(&self) -> Option<Identity> {
        self.identity
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, identity: Option<Identity>) {
        *self.identity.write().unwrap_or_else(|e| e.into_inner()) = identity;
    }

    /// Invoke every listener inside a per-listener fault barrier.
    ///
    /// A panicking subscriber is logged and skipped; the rest still run.
    fn notify_listeners(&self, identity: Option<&Identity>) {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        for listener in listeners.iter() {
            if catch_unwind(AssertUnwindSafe(|| listener(identity))).is_err() {
                tracing::error!("Auth state listener panicked");
            }
        }
    }
}

/// Read-only view of the auth state, for injection into other services.
#[derive(Clone)]
pub struct AuthHandle {
    state: Arc<AuthState>,
}

impl AuthHandle {
    pub fn current_identity(&self) -> Option<Identity> {
        self.state.current()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state
            .identity
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

/// Auth facade over an [`IdentityProvider`].
pub struct AuthService<P> {
    provider: Arc<P>,
    state: Arc<AuthState>,
    notifier: Arc<dyn Notifier>,
    adapter_wait: Duration,
}

impl<P: IdentityProvider> AuthService<P> {
    /// `adapter_wait` bounds both the initial readiness wait and the
    /// readiness wait before a federated sign-in.
    pub fn new(provider: Arc<P>, notifier: Arc<dyn Notifier>, adapter_wait: Duration) -> Self {
        Self {
            provider,
            state: Arc::new(AuthState::default()),
            notifier,
            adapter_wait,
        }
    }

    /// Wait for the adapter, restore any persisted session, and perform the
    /// first listener notification.
    ///
    /// Fails with [`AppError::AdapterUnavailable`] when the adapter does not
    /// become ready within the configured bound.
    pub async fn initialize(&self) -> Result<()> {
        self.wait_for_adapter().await?;

        let restored = self.provider.restore_session().await?;
        tracing::info!(
            signed_in = restored.is_some(),
            "Auth facade ready"
        );

        self.state.set(restored.clone());
        self.state.ready.store(true, Ordering::SeqCst);
        self.state.notify_listeners(restored.as_ref());
        Ok(())
    }

    async fn wait_for_adapter(&self) -> Result<()> {
        let started = Instant::now();
        while !self.provider.is_ready() {
            if started.elapsed() >= self.adapter_wait {
                tracing::error!(
                    wait_ms = self.adapter_wait.as_millis() as u64,
                    "Adapter readiness timeout"
                );
                return Err(AppError::AdapterUnavailable(
                    self.adapter_wait.as_millis() as u64
                ));
            }
            tokio::time::sleep(READINESS_POLL_INTERVAL).await;
        }
        Ok(())
    }

    /// Wait (bounded) until [`AuthService::initialize`] has completed.
    async fn ensure_ready(&self) -> Result<()> {
        let started = Instant::now();
        while !self.state.ready.load(Ordering::SeqCst) {
            if started.elapsed() >= self.adapter_wait {
                return Err(AppError::AdapterUnavailable(
                    self.adapter_wait.as_millis() as u64
                ));
            }
            tokio::time::sleep(READINESS_POLL_INTERVAL).await;
        }
        Ok(())
    }

    /// Federated sign-in. Listeners are notified before this returns.
    pub async fn sign_in_with_provider(&self) -> Result<Identity> {
        self.ensure_ready().await?;

        match self.provider.sign_in_with_provider().await {
            Ok(identity) => {
                let message = format!("Welcome {}!", identity.greeting_name());
                Ok(self.complete_sign_in(identity, &message))
            }
            Err(err) => Err(self.report_auth_failure("Provider sign-in failed", err)),
        }
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity> {
        match self.provider.sign_in_with_password(email, password).await {
            Ok(identity) => {
                let message = format!("Welcome {}!", identity.greeting_name());
                Ok(self.complete_sign_in(identity, &message))
            }
            Err(err) => Err(self.report_auth_failure("Email sign-in failed", err)),
        }
    }

    /// Sign up with email/password.
    ///
    /// Local preconditions fire before the adapter is ever called:
    /// confirmation mismatch is a validation failure, and the minimum
    /// password length (6 characters) is enforced client-side.
    pub async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Identity> {
        if password != confirm_password {
            let message = "Password confirmation does not match!";
            self.notifier.notify(message, Severity::Error);
            return Err(AppError::Validation(message.to_string()));
        }
        if password.chars().count() < 6 {
            return Err(self.report_auth_failure(
                "Email sign-up rejected locally",
                AppError::Auth(AuthErrorCode::WeakPassword),
            ));
        }

        match self.provider.sign_up_with_password(email, password).await {
            Ok(identity) => {
                let message = format!("Account created! Welcome {}!", identity.greeting_name());
                Ok(self.complete_sign_in(identity, &message))
            }
            Err(err) => Err(self.report_auth_failure("Email sign-up failed", err)),
        }
    }

    /// Sign out and notify listeners with an absent identity.
    pub async fn sign_out(&self) -> Result<()> {
        if let Err(err) = self.provider.sign_out().await {
            tracing::error!(error = %err, "Sign out failed");
            self.notifier.notify("Error signing out!", Severity::Error);
            return Err(err);
        }

        self.state.set(None);
        self.state.notify_listeners(None);
        self.notifier.notify("Signed out!", Severity::Success);
        Ok(())
    }

    /// Register an auth-state listener.
    ///
    /// Invoked immediately with the current identity once the facade is
    /// ready, and on every subsequent change.
    pub fn subscribe(&self, listener: impl Fn(Option<&Identity>) + Send + Sync + 'static) {
        let mut listeners = self
            .state
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        listeners.push(Box::new(listener));
        drop(listeners);

        // Late subscribers get the current state right away.
        if self.state.ready.load(Ordering::SeqCst) {
            let current = self.state.current();
            let listeners = self
                .state
                .listeners
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if let Some(added) = listeners.last() {
                if catch_unwind(AssertUnwindSafe(|| added(current.as_ref()))).is_err() {
                    tracing::error!("Auth state listener panicked");
                }
            }
        }
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state.current()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.current().is_some()
    }

    /// Handle for injecting the auth state into other services.
    pub fn handle(&self) -> AuthHandle {
        AuthHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn complete_sign_in(&self, identity: Identity, message: &str) -> Identity {
        tracing::info!(user_id = %identity.id, "Signed in");
        self.state.set(Some(identity.clone()));
        self.state.notify_listeners(Some(&identity));
        self.notifier.notify(message, Severity::Success);
        identity
    }

    fn report_auth_failure(&self, context: &str, err: AppError) -> AppError {
        tracing::error!(error = %err, "{}", context);
        self.notifier.notify(&err.to_string(), Severity::Error);
        err
    }
}
