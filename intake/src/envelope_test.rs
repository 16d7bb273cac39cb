use super::*;
use serde_json::json;

fn unwrap_body(body: Value) -> Result<Value, ClientError> {
    ResponsePolicy::EnvelopeUnwrap.interpret(body, &SuccessCodes::patient_api())
}

#[test]
fn unwrap_returns_data_on_success_envelope() {
    let body = json!({ "base": { "code": "200", "msg": "ok" }, "data": { "id": 1 } });
    assert_eq!(unwrap_body(body).unwrap(), json!({ "id": 1 }));
}

#[test]
fn unwrap_rejects_non_success_code_with_message() {
    let body = json!({ "base": { "code": "400", "msg": "bad" } });
    let err = unwrap_body(body).unwrap_err();
    assert!(matches!(&err, ClientError::Application { code, message } if code == "400" && message == "bad"));
    assert_eq!(err.to_string(), "bad");
}

#[test]
fn unwrap_prefers_data_even_when_code_is_failure() {
    let body = json!({ "base": { "code": "500", "msg": "partial" }, "data": [1, 2] });
    assert_eq!(unwrap_body(body).unwrap(), json!([1, 2]));
}

#[test]
fn unwrap_returns_whole_body_for_success_code_without_data() {
    let body = json!({ "base": { "code": "0", "msg": "done" } });
    assert_eq!(unwrap_body(body.clone()).unwrap(), body);
}

#[test]
fn unwrap_returns_whole_body_without_envelope() {
    let body = json!({ "items": [] });
    assert_eq!(unwrap_body(body.clone()).unwrap(), body);
}

#[test]
fn unwrap_treats_falsy_data_as_missing() {
    for data in [json!(null), json!(false), json!(0), json!("")] {
        let body = json!({ "base": { "code": "401", "msg": "nope" }, "data": data });
        assert!(unwrap_body(body).is_err(), "falsy data should not resolve");
    }
}

#[test]
fn unwrap_keeps_empty_collections_as_data() {
    let body = json!({ "base": { "code": "400", "msg": "x" }, "data": [] });
    assert_eq!(unwrap_body(body).unwrap(), json!([]));
}

#[test]
fn unwrap_compares_numeric_codes_as_strings() {
    let ok = json!({ "base": { "code": 200, "msg": "ok" } });
    assert!(unwrap_body(ok).is_ok());

    let bad = json!({ "base": { "code": 10001, "msg": "expired" } });
    let err = unwrap_body(bad).unwrap_err();
    assert!(matches!(err, ClientError::Application { code, .. } if code == "10001"));
}

#[test]
fn unwrap_defaults_message_when_msg_missing() {
    let body = json!({ "base": { "code": "400" } });
    let err = unwrap_body(body).unwrap_err();
    assert_eq!(err.to_string(), APPLICATION_FAILURE_MESSAGE);
}

#[test]
fn unwrap_uses_configured_success_codes() {
    let policy = ResponsePolicy::EnvelopeUnwrap;
    let body = json!({ "base": { "code": "200", "msg": "ok" } });
    assert!(policy.interpret(body, &SuccessCodes::doctor()).is_err());

    let body = json!({ "base": { "code": "10000", "msg": "ok" } });
    assert!(policy.interpret(body, &SuccessCodes::doctor()).is_ok());
}

#[test]
fn passthrough_returns_body_verbatim() {
    let body = json!({ "base": { "code": "400", "msg": "bad" } });
    assert_eq!(ResponsePolicy::Passthrough.interpret(body.clone(), &SuccessCodes::patient_api()).unwrap(), body);
}

#[test]
fn check_code_accepts_success_and_bare_bodies() {
    let codes = SuccessCodes::doctor();
    assert!(check_code(&json!({ "base": { "code": 10000, "msg": "ok" } }), &codes).is_ok());
    assert!(check_code(&json!({ "token": "t" }), &codes).is_ok());
    assert!(check_code(&Value::Null, &codes).is_ok());
}

#[test]
fn check_code_rejects_failure_sentinel_even_with_data() {
    let body = json!({ "base": { "code": "20001", "msg": "wrong password" }, "data": { "token": "t" } });
    let err = check_code(&body, &SuccessCodes::doctor()).unwrap_err();
    assert!(matches!(&err, ClientError::Application { code, message } if code == "20001" && message == "wrong password"));
}

#[test]
fn parse_list_trims_and_skips_blanks() {
    let codes = SuccessCodes::parse_list(" 200, ,0,");
    assert_eq!(codes.iter().collect::<Vec<_>>(), vec!["0", "200"]);
    assert!(SuccessCodes::parse_list(" , ").is_empty());
}

#[test]
fn typed_envelope_accepts_numeric_code_and_missing_data() {
    let envelope: Envelope<Value> = serde_json::from_value(json!({ "base": { "code": 10000, "msg": "ok" } })).unwrap();
    assert_eq!(envelope.base.code, "10000");
    assert_eq!(envelope.data, None);
}

#[test]
fn into_data_checks_code_and_presence() {
    let codes = SuccessCodes::doctor();

    let ok: Envelope<u32> = serde_json::from_value(json!({ "base": { "code": "10000", "msg": "" }, "data": 7 })).unwrap();
    assert_eq!(ok.into_data(&codes).unwrap(), 7);

    let failed: Envelope<u32> = serde_json::from_value(json!({ "base": { "code": "20001", "msg": "no" } })).unwrap();
    assert!(matches!(failed.into_data(&codes), Err(ClientError::Application { .. })));

    let empty: Envelope<u32> = serde_json::from_value(json!({ "base": { "code": "10000", "msg": "" } })).unwrap();
    assert!(matches!(empty.into_data(&codes), Err(ClientError::Decode(_))));
}
