//! Outgoing request descriptor and the request interceptor.
//!
//! SYSTEM CONTEXT
//! ==============
//! Endpoint functions build an [`OutgoingRequest`]; the owning client passes
//! it through [`RequestInterceptor::apply`] before handing it to the
//! transport. The interceptor is the only place that attaches bearer tokens
//! or repackages POST payloads as multipart fields.

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

use std::fmt;

use serde_json::Value;

use crate::error::ClientError;
use crate::session::{Role, Session};

pub const AUTHORIZATION: &str = "Authorization";

// =============================================================================
// REQUEST DESCRIPTOR
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File content for a multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(FilePart),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FieldValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: FieldValue::Text(value.into()) }
    }

    pub fn file(name: impl Into<String>, file: FilePart) -> Self {
        Self { name: name.into(), value: FieldValue::File(file) }
    }

    /// Text content, or `None` for file fields.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Text(text) => Some(text),
            FieldValue::File(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FormField>),
}

/// One backend call before base URL and timeout are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl OutgoingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), headers: Vec::new(), body: RequestBody::Empty }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    /// Replace any header with the same name (case-insensitive).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// =============================================================================
// INTERCEPTOR
// =============================================================================

/// What to send when the role's token is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingToken {
    /// Leave the request without an `Authorization` header.
    Omit,
    /// Send `Authorization: Bearer ` with an empty credential.
    EmptyBearer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthAttachment {
    pub role: Role,
    pub when_missing: MissingToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestInterceptor {
    pub auth: Option<AuthAttachment>,
    pub multipart_posts: bool,
}

impl RequestInterceptor {
    /// Attach the bearer header and repackage POST payloads as configured.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MultipartEncode`] when a POST payload cannot be
    /// expressed as multipart text fields.
    pub fn apply(&self, mut request: OutgoingRequest, session: &Session) -> Result<OutgoingRequest, ClientError> {
        if self.multipart_posts && request.method == Method::Post {
            if let RequestBody::Json(payload) = &request.body {
                if !payload.is_null() {
                    let fields = multipart_fields(payload)?;
                    request.body = RequestBody::Multipart(fields);
                }
            }
        }

        if let Some(auth) = self.auth {
            match (session.token(auth.role), auth.when_missing) {
                (Some(token), _) => request.set_header(AUTHORIZATION, bearer(&token)),
                (None, MissingToken::EmptyBearer) => request.set_header(AUTHORIZATION, bearer("")),
                (None, MissingToken::Omit) => {}
            }
        }

        Ok(request)
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// One text field per key of a JSON object payload.
///
/// # Errors
///
/// Returns [`ClientError::MultipartEncode`] for non-object payloads and for
/// nested array/object values.
pub fn multipart_fields(payload: &Value) -> Result<Vec<FormField>, ClientError> {
    let Value::Object(map) = payload else {
        return Err(ClientError::MultipartEncode(format!("expected a JSON object payload, got {}", kind(payload))));
    };

    map.iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => "null".to_owned(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ClientError::MultipartEncode(format!(
                        "field `{key}` holds a nested {} and cannot be a form field",
                        kind(value)
                    )));
                }
            };
            Ok(FormField::text(key.clone(), text))
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
