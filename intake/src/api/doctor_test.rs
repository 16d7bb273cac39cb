use super::*;
use crate::envelope::SuccessCodes;
use crate::session::Role;
use crate::test_helpers::{fixture, header};
use serde_json::json;

#[test]
fn summary_endpoint_formats_expected_path() {
    assert_eq!(summary_endpoint("rec-9"), "/doctor/summary/rec-9");
}

#[tokio::test]
async fn queue_sends_user_id_and_doctor_token() {
    let fx = fixture();
    fx.session.set_token(Role::Doctor, "dr-token").unwrap();
    fx.transport.reply(200, json!({ "base": { "code": "10000", "msg": "ok" }, "data": { "record_ids": ["r1", "r2"] } }));

    let response = get_doctor_queue(&fx.clients.doctor, "doc-1").await.unwrap();
    assert_eq!(response.base.code, "10000");
    let data = response.into_data(&SuccessCodes::doctor()).unwrap();
    assert_eq!(data.record_ids, vec!["r1".to_owned(), "r2".to_owned()]);

    let sent = fx.transport.last();
    assert_eq!(sent.url, "http://124.221.70.136:11391/doctor/queue");
    assert_eq!(sent.query, vec![("user_id".to_owned(), "doc-1".to_owned())]);
    assert_eq!(header(&sent, "authorization"), Some("Bearer dr-token"));
}

#[tokio::test]
async fn patient_detail_decodes_camel_case_fields() {
    let fx = fixture();
    fx.transport.reply(
        200,
        json!({
            "base": { "code": "10000", "msg": "ok" },
            "data": { "id": "p1", "name": "Li", "gender": "F", "age": 34, "chiefComplaint": "cough" }
        }),
    );

    let detail = get_patient_detail(&fx.clients.doctor, "rec-1").await.unwrap().data.unwrap();
    assert_eq!(detail.chief_complaint, "cough");
    assert_eq!(detail.age, 34);
    assert_eq!(detail.wait_time, None);

    let sent = fx.transport.last();
    assert_eq!(sent.url, "http://124.221.70.136:11391/doctor/patient/detail");
    assert_eq!(sent.query, vec![("record_id".to_owned(), "rec-1".to_owned())]);
}

#[tokio::test]
async fn summary_without_token_sends_empty_bearer() {
    let fx = fixture();
    fx.transport.reply(
        200,
        json!({
            "base": { "code": "10000", "msg": "ok" },
            "data": {
                "user": {
                    "id": "u1", "phone_number": "138", "username": "li",
                    "created_at": "2024-01-01", "updated_at": "2024-01-02"
                },
                "ai_result": {
                    "submission_id": "s1", "is_department": true,
                    "key_info": { "chief_complaint": "fever", "key_symptoms": "chills", "important_notes": "none" }
                }
            }
        }),
    );

    let summary = get_disease_summary(&fx.clients.doctor, "rec-2").await.unwrap();
    let data = summary.data.unwrap();
    assert_eq!(data.user.username, "li");
    assert!(data.ai_result.is_department);
    assert_eq!(data.ai_result.key_info.image_summary, None);

    let sent = fx.transport.last();
    assert!(sent.url.ends_with("/doctor/summary/rec-2"));
    assert!(sent.query.is_empty());
    assert_eq!(header(&sent, "authorization"), Some("Bearer "));
}

#[tokio::test]
async fn failure_envelope_is_returned_for_caller_to_check() {
    let fx = fixture();
    fx.transport.reply(200, json!({ "base": { "code": "20003", "msg": "token invalid" } }));

    let response = get_doctor_queue(&fx.clients.doctor, "doc-1").await.unwrap();
    let err = response.into_data(&fx.clients.doctor.config().success_codes).unwrap_err();
    assert_eq!(err.to_string(), "token invalid");
}

#[tokio::test]
async fn non_envelope_body_is_a_decode_error() {
    let fx = fixture();
    fx.transport.reply(200, json!("<html>gateway</html>"));

    let err = get_doctor_queue(&fx.clients.doctor, "doc-1").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}
