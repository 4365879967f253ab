// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Auth (Identity Toolkit) REST adapter.
//!
//! Implements [`IdentityProvider`] over the `accounts:*` REST endpoints.
//! Federated sign-in consumes a Google ID token from an injected
//! [`ProviderTokenSource`] — the embedding UI runs the popup flow and hands
//! the resulting token down here.
//!
//! For local development with the Auth emulator, set
//! FIREBASE_AUTH_EMULATOR_HOST.

use crate::error::{AppError, AuthErrorCode, Result};
use crate::models::Identity;
use crate::services::auth::IdentityProvider;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

const PROD_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Supplies a Google ID token for federated sign-in.
///
/// May fail with popup-flow error codes (`PopupBlocked`,
/// `PopupClosedByUser`).
pub type ProviderTokenSource =
    Box<dyn Fn() -> std::result::Result<String, AuthErrorCode> + Send + Sync>;

/// Active session, held in memory only.
struct Session {
    identity: Identity,
    #[allow(dead_code)]
    id_token: String,
    #[allow(dead_code)]
    refresh_token: String,
}

/// REST client for Firebase Authentication.
pub struct FirebaseAuthClient {
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
    session: RwLock<Option<Session>>,
    provider_token_source: Option<ProviderTokenSource>,
}

impl FirebaseAuthClient {
    pub fn new(api_key: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building auth HTTP client")?;

        let endpoint = match std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
            Ok(host) => {
                tracing::info!(host = %host, "Using Firebase Auth emulator");
                format!("http://{}/identitytoolkit.googleapis.com/v1", host)
            }
            Err(_) => PROD_ENDPOINT.to_string(),
        };

        Ok(Self {
            http_client,
            api_key: api_key.to_string(),
            endpoint,
            session: RwLock::new(None),
            provider_token_source: None,
        })
    }

    /// Attach the popup-flow token source for federated sign-in.
    pub fn with_provider_token_source(
        mut self,
        source: impl Fn() -> std::result::Result<String, AuthErrorCode> + Send + Sync + 'static,
    ) -> Self {
        self.provider_token_source = Some(Box::new(source));
        self
    }

    async fn call(&self, action: &str, body: &impl Serialize) -> Result<SignInResponse> {
        let url = format!("{}/accounts:{}?key={}", self.endpoint, action, self.api_key);

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(action, error = %e, "Auth request failed to send");
                AppError::Auth(AuthErrorCode::NetworkFailure)
            })?;

        if response.status().is_success() {
            response
                .json::<SignInResponse>()
                .await
                .map_err(|e| AppError::Auth(AuthErrorCode::Unknown(e.to_string())))
        } else {
            let status = response.status();
            let message = response
                .json::<RestErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.to_string());
            tracing::warn!(action, %status, message = %message, "Auth request rejected");
            Err(AppError::Auth(map_rest_error(&message)))
        }
    }

    fn store_session(&self, response: SignInResponse) -> Identity {
        let identity = Identity {
            id: response.local_id,
            email: response.email,
            display_name: response.display_name,
            avatar_url: response.photo_url,
        };
        let mut session = self.session.write().unwrap_or_else(|e| e.into_inner());
        *session = Some(Session {
            identity: identity.clone(),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
        });
        identity
    }
}

impl IdentityProvider for FirebaseAuthClient {
    fn is_ready(&self) -> bool {
        true
    }

    async fn restore_session(&self) -> Result<Option<Identity>> {
        let session = self.session.read().unwrap_or_else(|e| e.into_inner());
        Ok(session.as_ref().map(|s| s.identity.clone()))
    }

    async fn sign_in_with_provider(&self) -> Result<Identity> {
        let source = self
            .provider_token_source
            .as_ref()
            .ok_or(AppError::Auth(AuthErrorCode::NotConfigured))?;
        let id_token = source().map_err(AppError::Auth)?;

        let request = IdpRequest {
            post_body: format!("id_token={}&providerId=google.com", id_token),
            request_uri: "http://localhost",
            return_secure_token: true,
            return_idp_credential: true,
        };
        let response = self.call("signInWithIdp", &request).await?;
        Ok(self.store_session(response))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response = self.call("signInWithPassword", &request).await?;
        Ok(self.store_session(response))
    }

    async fn sign_up_with_password(&self, email: &str, password: &str) -> Result<Identity> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response = self.call("signUp", &request).await?;
        Ok(self.store_session(response))
    }

    async fn sign_out(&self) -> Result<()> {
        // No server-side call: dropping the tokens ends the session.
        let mut session = self.session.write().unwrap_or_else(|e| e.into_inner());
        *session = None;
        Ok(())
    }
}

/// Map an Identity Toolkit error code to our taxonomy.
///
/// Messages sometimes carry a detail suffix ("WEAK_PASSWORD : Password
/// should be at least 6 characters"); only the leading code is matched.
fn map_rest_error(message: &str) -> AuthErrorCode {
    let code = message.split(':').next().unwrap_or(message).trim();
    match code {
        "EMAIL_NOT_FOUND" => AuthErrorCode::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthErrorCode::WrongPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
        "USER_DISABLED" => AuthErrorCode::UserDisabled,
        "EMAIL_EXISTS" => AuthErrorCode::EmailInUse,
        "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
        "OPERATION_NOT_ALLOWED" => AuthErrorCode::NotConfigured,
        other => AuthErrorCode::Unknown(other.to_string()),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: &'static str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    id_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct RestErrorBody {
    error: RestErrorDetail,
}

#[derive(Deserialize)]
struct RestErrorDetail {
    message: String,
}
