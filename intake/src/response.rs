//! Response interceptor: policy application plus failure notifications.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is returned to the caller. Notifications are a side channel:
//! 401/403 raise [`Notice::AuthorizationFailed`], other transport failures
//! raise [`Notice::RequestFailed`], and envelope rejections raise
//! [`Notice::ApplicationError`]. None of them redirect or retry.

#[cfg(test)]
#[path = "response_test.rs"]
mod response_test;

use std::sync::Arc;

use serde_json::Value;

use crate::envelope::{ResponsePolicy, SuccessCodes};
use crate::error::ClientError;
use crate::notify::{NETWORK_FAILURE_MESSAGE, Notice, Notifier};
use crate::transport::{RawResponse, TransportError};

#[derive(Clone)]
pub struct ResponseInterceptor {
    policy: ResponsePolicy,
    success_codes: SuccessCodes,
    notify_on_failure: bool,
    notifier: Arc<dyn Notifier>,
}

impl ResponseInterceptor {
    pub fn new(
        policy: ResponsePolicy,
        success_codes: SuccessCodes,
        notify_on_failure: bool,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { policy, success_codes, notify_on_failure, notifier }
    }

    /// Resolve the caller-facing value for one transport result.
    ///
    /// # Errors
    ///
    /// Returns the transport error, a [`ClientError::Status`] for non-2xx
    /// responses, or the policy's [`ClientError::Application`] rejection.
    pub fn handle(&self, result: Result<RawResponse, TransportError>) -> Result<Value, ClientError> {
        let response = match result {
            Ok(response) => response,
            Err(e) => return Err(self.on_failure(ClientError::Transport(e))),
        };
        if !response.is_success() {
            return Err(self.on_failure(ClientError::Status { status: response.status, body: response.body }));
        }

        self.policy.interpret(response.body, &self.success_codes).map_err(|e| {
            if let ClientError::Application { code, message } = &e {
                tracing::warn!(%code, %message, "envelope rejected");
                self.notifier.notify(&Notice::ApplicationError(message.clone()));
            }
            e
        })
    }

    fn on_failure(&self, error: ClientError) -> ClientError {
        tracing::warn!(status = ?error.status(), error = %error, "API request failed");
        if self.notify_on_failure {
            self.notifier.notify(&failure_notice(&error));
        }
        error
    }
}

/// Notice shown for a transport-level failure.
#[must_use]
pub fn failure_notice(error: &ClientError) -> Notice {
    if error.is_authorization() {
        return Notice::AuthorizationFailed;
    }
    let message = match error {
        ClientError::Transport(TransportError::Network(detail)) if detail.trim().is_empty() => {
            NETWORK_FAILURE_MESSAGE.to_owned()
        }
        ClientError::Application { message, .. } if message.trim().is_empty() => NETWORK_FAILURE_MESSAGE.to_owned(),
        other => other.to_string(),
    };
    Notice::RequestFailed(message)
}
