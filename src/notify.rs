//! UI notification seam.
//!
//! Every user-visible outcome goes through [`Notifier::notify`]; the toast
//! rendering itself belongs to the embedding UI.

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
}

/// Collaborator that surfaces messages to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Default notifier routing messages into the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Success => tracing::info!(message, "notification"),
            Severity::Warning => tracing::warn!(message, "notification"),
            Severity::Error => tracing::error!(message, "notification"),
        }
    }
}
