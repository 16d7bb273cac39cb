//! Client instances: base address, timeout and the interceptor pair.
//!
//! SYSTEM CONTEXT
//! ==============
//! The app runs three instances against one backend:
//!
//! - `patient_login`: absolute origin, multipart POSTs, passthrough bodies,
//!   no auth header.
//! - `patient_api`: the `/api` base proxied by the dev server, patient bearer
//!   token, envelope unwrapping, toast notifications on failure.
//! - `doctor`: the patient-login origin and policy, plus the doctor bearer
//!   token (an empty bearer when logged out).
//!
//! Each call runs request interceptor → transport → response interceptor.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::config::IntakeConfig;
use crate::envelope::{ResponsePolicy, SuccessCodes};
use crate::error::ClientError;
use crate::notify::Notifier;
use crate::request::{AuthAttachment, Method, MissingToken, OutgoingRequest, RequestBody, RequestInterceptor};
use crate::response::ResponseInterceptor;
use crate::session::{Role, Session};
use crate::transport::{PreparedRequest, ReqwestTransport, Transport};

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Instance name used in logs.
    pub name: &'static str,
    pub base_url: String,
    pub timeout: Duration,
    pub auth: Option<AuthAttachment>,
    pub multipart_posts: bool,
    pub policy: ResponsePolicy,
    pub notify_on_failure: bool,
    /// Success sentinel for this integration. The only copy: the envelope
    /// policy checks it, and passthrough callers pass it to
    /// [`crate::envelope::check_code`] or `Envelope::into_data`.
    pub success_codes: SuccessCodes,
}

impl ClientConfig {
    #[must_use]
    pub fn patient_login(origin: &str, timeout: Duration, success_codes: SuccessCodes) -> Self {
        Self {
            name: "patient_login",
            base_url: trim_base(origin),
            timeout,
            auth: None,
            multipart_posts: true,
            policy: ResponsePolicy::Passthrough,
            notify_on_failure: false,
            success_codes,
        }
    }

    #[must_use]
    pub fn patient_api(base_url: &str, timeout: Duration, success_codes: SuccessCodes) -> Self {
        Self {
            name: "patient_api",
            base_url: trim_base(base_url),
            timeout,
            auth: Some(AuthAttachment { role: Role::Patient, when_missing: MissingToken::Omit }),
            multipart_posts: false,
            policy: ResponsePolicy::EnvelopeUnwrap,
            notify_on_failure: true,
            success_codes,
        }
    }

    /// The doctor instance shares the patient-login origin, policy and codes.
    #[must_use]
    pub fn doctor(origin: &str, timeout: Duration, success_codes: SuccessCodes) -> Self {
        Self {
            name: "doctor",
            auth: Some(AuthAttachment { role: Role::Doctor, when_missing: MissingToken::EmptyBearer }),
            ..Self::patient_login(origin, timeout, success_codes)
        }
    }

    fn request_interceptor(&self) -> RequestInterceptor {
        RequestInterceptor { auth: self.auth, multipart_posts: self.multipart_posts }
    }
}

fn trim_base(base: &str) -> String {
    base.trim_end_matches('/').to_owned()
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    request: RequestInterceptor,
    response: ResponseInterceptor,
    session: Session,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        session: Session,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let request = config.request_interceptor();
        let response = ResponseInterceptor::new(
            config.policy.clone(),
            config.success_codes.clone(),
            config.notify_on_failure,
            notifier,
        );
        Self { config, request, response, session, transport }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run one request through the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns interceptor, transport, status or envelope errors; see
    /// [`ClientError`].
    pub async fn send(&self, request: OutgoingRequest) -> Result<Value, ClientError> {
        let request = self.request.apply(request, &self.session).inspect_err(|e| {
            tracing::warn!(client = self.config.name, error = %e, "request interceptor rejected call");
        })?;

        let prepared = PreparedRequest {
            method: request.method,
            url: format!("{}{}", self.config.base_url, request.path),
            query: request.query,
            headers: request.headers,
            body: request.body,
            timeout: self.config.timeout,
        };
        tracing::debug!(
            client = self.config.name,
            method = %prepared.method,
            url = %prepared.url,
            "sending API request"
        );

        let result = self.transport.send(prepared).await;
        if let Ok(response) = &result {
            tracing::debug!(client = self.config.name, status = response.status, "API response received");
        }
        self.response.handle(result)
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ClientError> {
        let mut request = OutgoingRequest::get(path);
        request.query = owned_pairs(query);
        self.send(request).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post(&self, path: &str, body: RequestBody) -> Result<Value, ClientError> {
        let mut request = OutgoingRequest::post(path);
        request.body = body;
        self.send(request).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put(&self, path: &str, body: RequestBody) -> Result<Value, ClientError> {
        let mut request = OutgoingRequest::new(Method::Put, path);
        request.body = body;
        self.send(request).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.send(OutgoingRequest::new(Method::Delete, path)).await
    }
}

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

// =============================================================================
// CLIENT SET
// =============================================================================

/// The three instances the app uses, sharing one session and transport.
#[derive(Clone)]
pub struct Clients {
    pub patient_login: ApiClient,
    pub patient_api: ApiClient,
    pub doctor: ApiClient,
}

impl Clients {
    /// Build all instances over a shared `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &IntakeConfig, session: Session, notifier: Arc<dyn Notifier>) -> Result<Self, ClientError> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(config.connect_timeout)?);
        Ok(Self::with_transport(config, session, transport, notifier))
    }

    pub fn with_transport(
        config: &IntakeConfig,
        session: Session,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let build = |client_config: ClientConfig| {
            ApiClient::new(client_config, session.clone(), transport.clone(), notifier.clone())
        };
        Self {
            patient_login: build(ClientConfig::patient_login(
                &config.login_origin,
                config.login_timeout,
                config.doctor_success_codes.clone(),
            )),
            patient_api: build(ClientConfig::patient_api(
                &config.api_base_url,
                config.api_timeout,
                config.api_success_codes.clone(),
            )),
            doctor: build(ClientConfig::doctor(
                &config.login_origin,
                config.login_timeout,
                config.doctor_success_codes.clone(),
            )),
        }
    }
}
