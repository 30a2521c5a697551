//! Coinglass response envelope and its validator
//!
//! Every endpoint answers `{ "code": "<string>", "msg": "<string>", "data": ... }`.
//! A response is successful only when `code` equals [`SUCCESS_CODE`].

use serde::Serialize;
use serde_json::Value;

use super::coinglass_config::SUCCESS_CODE;
use super::{FetcherError, FetcherResult};

/// Parsed response envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiEnvelope {
    /// Status code (`"0"` on success)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Payload records, in response order
    pub data: Vec<Value>,
    /// `code` arrived as a JSON number rather than a string
    #[serde(skip)]
    numeric_code: bool,
}

impl ApiEnvelope {
    /// Parse a response body.
    ///
    /// # Errors
    /// `MalformedResponse` if the body is not JSON or not an envelope object.
    pub fn parse(body: &str) -> FetcherResult<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| FetcherError::MalformedResponse(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Interpret an already-parsed JSON value as an envelope.
    ///
    /// `code` may be a string or a number, but only the string sentinel is
    /// success. `data` may be an array, a single object (treated as one
    /// record), or absent/null (no records).
    pub fn from_value(value: Value) -> FetcherResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(FetcherError::MalformedResponse(
                "response body is not a JSON object".to_string(),
            ));
        };

        let (code, numeric_code) = match map.remove("code") {
            Some(Value::String(s)) => (s, false),
            Some(Value::Number(n)) => (n.to_string(), true),
            _ => (String::new(), false),
        };

        let message = match map.remove("msg") {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let data = match map.remove("data") {
            Some(Value::Array(records)) => records,
            Some(record @ Value::Object(_)) => vec![record],
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(FetcherError::MalformedResponse(format!(
                    "unexpected data payload: {other}"
                )))
            }
        };

        Ok(Self {
            code,
            message,
            data,
            numeric_code,
        })
    }

    /// Whether the code equals the success sentinel
    pub fn is_success(&self) -> bool {
        !self.numeric_code && self.code == SUCCESS_CODE
    }
}

/// Distinguishes success envelopes from application-level failures
pub struct ResponseValidator;

impl ResponseValidator {
    /// Return the payload of a successful envelope.
    ///
    /// # Errors
    /// `ApiError` carrying the envelope message when the code is not the
    /// success sentinel. These are never retried.
    pub fn validate(envelope: ApiEnvelope) -> FetcherResult<Vec<Value>> {
        if envelope.is_success() {
            Ok(envelope.data)
        } else {
            Err(FetcherError::ApiError {
                code: envelope.code,
                message: envelope.message,
            })
        }
    }
}
