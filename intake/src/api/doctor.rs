//! Doctor endpoints on the doctor instance.
//!
//! The doctor instance uses the passthrough policy, so these functions
//! return the full envelope; callers check it with
//! [`Envelope::into_data`](crate::envelope::Envelope::into_data).

#[cfg(test)]
#[path = "doctor_test.rs"]
mod doctor_test;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{DoctorQueueResponse, PatientDetailResponse, SummaryResponse};
use crate::client::ApiClient;
use crate::error::ClientError;

pub const QUEUE_PATH: &str = "/doctor/queue";
pub const PATIENT_DETAIL_PATH: &str = "/doctor/patient/detail";

pub(crate) fn summary_endpoint(record_id: &str) -> String {
    format!("/doctor/summary/{record_id}")
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

/// `GET /doctor/queue?user_id=...`: record ids waiting for this doctor.
///
/// # Errors
///
/// See [`ApiClient::send`]; [`ClientError::Decode`] if the body is not an
/// envelope of the declared shape.
pub async fn get_doctor_queue(client: &ApiClient, user_id: &str) -> Result<DoctorQueueResponse, ClientError> {
    decode(client.get(QUEUE_PATH, &[("user_id", user_id)]).await?)
}

/// `GET /doctor/patient/detail?record_id=...`.
///
/// # Errors
///
/// See [`get_doctor_queue`].
pub async fn get_patient_detail(client: &ApiClient, record_id: &str) -> Result<PatientDetailResponse, ClientError> {
    decode(client.get(PATIENT_DETAIL_PATH, &[("record_id", record_id)]).await?)
}

/// `GET /doctor/summary/{recordId}`: user profile plus AI intake summary.
///
/// # Errors
///
/// See [`get_doctor_queue`].
pub async fn get_disease_summary(client: &ApiClient, record_id: &str) -> Result<SummaryResponse, ClientError> {
    decode(client.get(&summary_endpoint(record_id), &[]).await?)
}
