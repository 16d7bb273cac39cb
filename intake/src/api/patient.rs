//! Patient endpoints: login/registration on the patient-login instance,
//! departments and questionnaires on the patient API instance.

#[cfg(test)]
#[path = "patient_test.rs"]
mod patient_test;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::request::{FilePart, FormField, OutgoingRequest, RequestBody};

pub const LOGIN_PATH: &str = "/user/login";
pub const REGISTER_PATH: &str = "/user/register";
pub const DEPARTMENTS_PATH: &str = "/departments";
pub const SUBMIT_PATH: &str = "/questionnaires/submit";
pub const UPLOAD_PATH: &str = "/questionnaires/upload";
pub const UPLOAD_FIELD: &str = "file";

/// Login form as entered. The `email` input carries the account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Wire body for login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub phone_number: String,
    pub password: String,
}

impl From<&LoginForm> for Credentials {
    fn from(form: &LoginForm) -> Self {
        Self { phone_number: form.email.clone(), password: form.password.clone() }
    }
}

fn credentials_body(form: &LoginForm) -> RequestBody {
    let credentials = Credentials::from(form);
    RequestBody::Json(json!({ "phone_number": credentials.phone_number, "password": credentials.password }))
}

pub(crate) fn questionnaire_endpoint(dept_id: &str) -> String {
    format!("/questionnaires/{dept_id}")
}

/// `POST /user/login` (multipart via the patient-login instance).
///
/// # Errors
///
/// See [`ApiClient::send`].
pub async fn login(client: &ApiClient, form: &LoginForm) -> Result<Value, ClientError> {
    client.post(LOGIN_PATH, credentials_body(form)).await
}

/// `POST /user/register` (multipart via the patient-login instance).
///
/// # Errors
///
/// See [`ApiClient::send`].
pub async fn register(client: &ApiClient, form: &LoginForm) -> Result<Value, ClientError> {
    client.post(REGISTER_PATH, credentials_body(form)).await
}

/// `GET /departments`.
///
/// # Errors
///
/// See [`ApiClient::send`].
pub async fn get_departments(client: &ApiClient) -> Result<Value, ClientError> {
    client.get(DEPARTMENTS_PATH, &[]).await
}

/// `GET /questionnaires/{deptId}`.
///
/// # Errors
///
/// See [`ApiClient::send`].
pub async fn get_questionnaire(client: &ApiClient, dept_id: &str) -> Result<Value, ClientError> {
    client.get(&questionnaire_endpoint(dept_id), &[]).await
}

/// `POST /questionnaires/submit` with the answers as a JSON body.
///
/// # Errors
///
/// See [`ApiClient::send`].
pub async fn submit_questionnaire(client: &ApiClient, answers: Value) -> Result<Value, ClientError> {
    client.post(SUBMIT_PATH, RequestBody::Json(answers)).await
}

/// `POST /questionnaires/upload` with a single `file` multipart field.
///
/// # Errors
///
/// See [`ApiClient::send`].
pub async fn upload_file(client: &ApiClient, file: FilePart) -> Result<Value, ClientError> {
    let request = OutgoingRequest::post(UPLOAD_PATH).multipart(vec![FormField::file(UPLOAD_FIELD, file)]);
    client.send(request).await
}

/// Pull the session token out of a login response.
///
/// Checks `data.token`, `data.access_token`, `token`, `access_token` in that
/// order and ignores empty strings.
#[must_use]
pub fn session_token_from_login(body: &Value) -> Option<String> {
    let data = body.get("data");
    [
        data.and_then(|d| d.get("token")),
        data.and_then(|d| d.get("access_token")),
        body.get("token"),
        body.get("access_token"),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .find(|token| !token.is_empty())
    .map(ToOwned::to_owned)
}
