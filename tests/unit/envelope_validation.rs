//! Envelope parsing and validation over realistic response bodies

use coinglass_ingest::fetcher::envelope::{ApiEnvelope, ResponseValidator};
use coinglass_ingest::fetcher::FetcherError;

#[test]
fn test_success_envelope_yields_records() {
    let body = r#"{"code":"0","msg":"success","data":[{"time":1704067200000,"open":"1"},{"time":1704081600000,"open":"2"}]}"#;
    let records = ResponseValidator::validate(ApiEnvelope::parse(body).unwrap()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["open"], "2");
}

#[test]
fn test_success_without_data_is_empty() {
    let body = r#"{"code":"0","msg":"success"}"#;
    let records = ResponseValidator::validate(ApiEnvelope::parse(body).unwrap()).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_numeric_code_compared_as_text() {
    let envelope = ApiEnvelope::parse(r#"{"code":0,"data":[]}"#).unwrap();
    assert!(envelope.is_success());
}

#[test]
fn test_failure_envelope_carries_message() {
    let body = r#"{"code":"40001","msg":"API key missing"}"#;
    match ResponseValidator::validate(ApiEnvelope::parse(body).unwrap()) {
        Err(FetcherError::ApiError { code, message }) => {
            assert_eq!(code, "40001");
            assert_eq!(message, "API key missing");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[test]
fn test_non_json_body_is_malformed() {
    assert!(matches!(
        ApiEnvelope::parse("<html>502 Bad Gateway</html>"),
        Err(FetcherError::MalformedResponse(_))
    ));
}

#[test]
fn test_api_error_is_not_retryable() {
    let err = FetcherError::ApiError {
        code: "1".to_string(),
        message: "bad params".to_string(),
    };
    assert!(!err.is_retryable());
    assert!(FetcherError::NetworkError("reset".to_string()).is_retryable());
}
