//! Declared response shapes for the doctor endpoints.

use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;

/// `/doctor/queue` payload: record ids of waiting patients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueData {
    pub record_ids: Vec<String>,
}

/// `/doctor/patient/detail` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    pub id: String,
    pub name: String,
    pub gender: String,
    pub age: u32,
    pub chief_complaint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryUser {
    pub id: String,
    pub phone_number: String,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

/// Key facts extracted by the backend's AI pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub chief_complaint: String,
    pub key_symptoms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_summary: Option<String>,
    pub important_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResult {
    pub submission_id: String,
    pub is_department: bool,
    pub key_info: KeyInfo,
}

/// `/doctor/summary/{recordId}` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryData {
    pub user: SummaryUser,
    pub ai_result: AiResult,
}

pub type DoctorQueueResponse = Envelope<QueueData>;
pub type PatientDetailResponse = Envelope<PatientDetail>;
pub type SummaryResponse = Envelope<SummaryData>;
