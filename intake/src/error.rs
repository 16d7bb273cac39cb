//! Errors surfaced to endpoint callers.

use serde_json::Value;

use crate::transport::TransportError;

/// Failure of one client call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (network, timeout, encoding).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The backend answered with a non-2xx status.
    #[error("request failed with status code {status}")]
    Status { status: u16, body: Value },

    /// The envelope reported a `base.code` outside the success set.
    #[error("{message}")]
    Application { code: String, message: String },

    /// A POST payload could not be repackaged as multipart fields.
    #[error("multipart encoding failed: {0}")]
    MultipartEncode(String),

    /// A response body did not match the declared response type.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ClientError {
    /// HTTP status for [`ClientError::Status`].
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401/403 responses.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}
