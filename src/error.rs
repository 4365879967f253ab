// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types and user-facing message mapping.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Adapter not ready within {0} ms")]
    AdapterUnavailable(u64),

    #[error("{}", .0.user_message())]
    Auth(AuthErrorCode),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthErrorCode> for AppError {
    fn from(code: AuthErrorCode) -> Self {
        AppError::Auth(code)
    }
}

/// Provider-specific authentication failure categories.
///
/// Each code carries a stable human-readable message shown to the user;
/// callers match on the code, the UI shows `user_message()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    PopupBlocked,
    PopupClosedByUser,
    NetworkFailure,
    NotConfigured,
    UserNotFound,
    WrongPassword,
    InvalidEmail,
    UserDisabled,
    EmailInUse,
    WeakPassword,
    Unknown(String),
}

impl AuthErrorCode {
    /// Human-readable message for UI notifications.
    pub fn user_message(&self) -> String {
        match self {
            Self::PopupBlocked => {
                "Popup was blocked! Please allow popups and try again.".to_string()
            }
            Self::PopupClosedByUser => "You closed the sign-in window.".to_string(),
            Self::NetworkFailure => {
                "Network error! Check your connection and try again.".to_string()
            }
            Self::NotConfigured => "Sign-in provider is not configured!".to_string(),
            Self::UserNotFound => "No account found for this email!".to_string(),
            Self::WrongPassword => "Incorrect password!".to_string(),
            Self::InvalidEmail => "Invalid email address!".to_string(),
            Self::UserDisabled => "This account has been disabled!".to_string(),
            Self::EmailInUse => "This email is already in use!".to_string(),
            Self::WeakPassword => "Password is too weak (minimum 6 characters)!".to_string(),
            Self::Unknown(detail) => format!("Sign-in failed: {}", detail),
        }
    }
}

/// Result type alias for facade operations
pub type Result<T> = std::result::Result<T, AppError>;
