//! Backend response envelope and the per-instance unwrapping policies.
//!
//! DESIGN
//! ======
//! Every backend body has the shape `{ base: { code, msg }, data }`, but the
//! success sentinel is not uniform: the doctor module documents `"10000"`
//! while the patient API checks `"200"`/`"0"`. Rather than unifying them,
//! each client instance carries its own [`SuccessCodes`] and a
//! [`ResponsePolicy`] chosen at construction. The policy only names the
//! behavior; the codes it checks are always passed in.

#[cfg(test)]
#[path = "envelope_test.rs"]
mod envelope_test;

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ClientError;
use crate::notify::APPLICATION_FAILURE_MESSAGE;

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Status block of the envelope. `code` accepts JSON strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    #[serde(deserialize_with = "code_string")]
    pub code: String,
    #[serde(default)]
    pub msg: String,
}

/// Typed envelope. `data` is absent on most failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub base: Base,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Check `base.code` against `success` and return the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Application`] when the code is not a success
    /// code, and [`ClientError::Decode`] when a success envelope has no data.
    pub fn into_data(self, success: &SuccessCodes) -> Result<T, ClientError> {
        if !success.contains(&self.base.code) {
            return Err(ClientError::Application { code: self.base.code, message: self.base.msg });
        }
        self.data.ok_or_else(|| ClientError::Decode("envelope has no data".to_owned()))
    }
}

fn code_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    code_as_string(&value).ok_or_else(|| serde::de::Error::custom("base.code must be a string or number"))
}

fn code_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// SUCCESS CODES
// =============================================================================

/// Set of `base.code` values an integration treats as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessCodes(BTreeSet<String>);

impl SuccessCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(codes.into_iter().map(Into::into).collect())
    }

    /// `"200"` and `"0"`, checked by the patient API.
    #[must_use]
    pub fn patient_api() -> Self {
        Self::new(["200", "0"])
    }

    /// `"10000"`, documented by the doctor module.
    #[must_use]
    pub fn doctor() -> Self {
        Self::new(["10000"])
    }

    /// Parse a comma-separated list, skipping blank entries.
    #[must_use]
    pub fn parse_list(raw: &str) -> Self {
        Self::new(raw.split(',').map(str::trim).filter(|code| !code.is_empty()))
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

// =============================================================================
// POLICY
// =============================================================================

/// How a client instance turns a 2xx body into the caller-facing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePolicy {
    /// Resolve with `data` when truthy, reject on a non-success `base.code`,
    /// otherwise resolve with the whole body.
    EnvelopeUnwrap,
    /// Resolve with the body verbatim; callers interpret the envelope.
    Passthrough,
}

impl ResponsePolicy {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EnvelopeUnwrap => "envelope_unwrap",
            Self::Passthrough => "passthrough",
        }
    }

    /// Apply the policy to a successful response body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Application`] when the envelope policy sees a
    /// `base.code` outside `success`.
    pub fn interpret(&self, body: Value, success: &SuccessCodes) -> Result<Value, ClientError> {
        if matches!(self, Self::Passthrough) {
            return Ok(body);
        }

        if let Some(data) = body.get("data").filter(|data| is_truthy(data)) {
            return Ok(data.clone());
        }

        check_code(&body, success)?;
        Ok(body)
    }
}

/// Reject a body whose `base.code` is present and outside `success`.
///
/// Bodies without an envelope pass. Used by the envelope policy and by
/// passthrough callers that still need the sentinel checked.
///
/// # Errors
///
/// Returns [`ClientError::Application`] carrying `base.msg`, or
/// [`APPLICATION_FAILURE_MESSAGE`] when the message is empty.
pub fn check_code(body: &Value, success: &SuccessCodes) -> Result<(), ClientError> {
    let base = body.get("base");
    let Some(code) = base.and_then(|b| b.get("code")).and_then(code_as_string) else {
        return Ok(());
    };
    if success.contains(&code) {
        return Ok(());
    }
    let message = base
        .and_then(|b| b.get("msg"))
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
        .unwrap_or(APPLICATION_FAILURE_MESSAGE)
        .to_owned();
    Err(ClientError::Application { code, message })
}

/// Loose truthiness used by the envelope check: `null`, `false`, `0` and
/// `""` are falsy; every array and object is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
