//! User-facing notifications raised by response interceptors.
//!
//! The browser app shows these as toasts. Here they go through the
//! [`Notifier`] seam so each surface decides how to render them.

use std::sync::Mutex;

pub const AUTHORIZATION_FAILED_MESSAGE: &str = "authorization failed, please log in again";
pub const NETWORK_FAILURE_MESSAGE: &str = "network request failed";
pub const APPLICATION_FAILURE_MESSAGE: &str = "request failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// HTTP 401/403 from the backend.
    AuthorizationFailed,
    /// Any other transport-level failure, carrying the error text.
    RequestFailed(String),
    /// Envelope `base.code` outside the success set, carrying `base.msg`.
    ApplicationError(String),
}

impl Notice {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::AuthorizationFailed => AUTHORIZATION_FAILED_MESSAGE,
            Self::RequestFailed(message) | Self::ApplicationError(message) => message,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthorizationFailed => "authorization_failed",
            Self::RequestFailed(_) => "request_failed",
            Self::ApplicationError(_) => "application_error",
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Renders notices as `warn!` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::warn!(kind = notice.kind(), message = notice.message(), "user notification");
    }
}

/// Collects notices in order. Used by tests and by callers that batch them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(notice.clone());
    }
}
