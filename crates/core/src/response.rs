//! Response envelope shared by the proxy routes and the API client
//!
//! Every `/api/*` route answers with `{success, status, message, data}`. On
//! the wire that is [`Envelope`]; callers work with the tagged
//! [`ApiResponse`] instead so that `data` only exists on success.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Status used for failures that never reached (or never came back from) the backend
pub const NETWORK_FAILURE_STATUS: u16 = 500;

/// Wire form of every dashboard API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = JsonValue> {
    pub success: bool,
    pub status: u16,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl Envelope<JsonValue> {
    /// Normalise an upstream HTTP response into an envelope.
    ///
    /// The HTTP status always wins over any `status` field in the body. Bodies
    /// that already look like an envelope keep their `message` and `data`;
    /// bare JSON bodies become the `data` of a successful response, and for
    /// failures their `message` or `error` field becomes the message.
    pub fn from_upstream(status: u16, body: &[u8]) -> Self {
        let ok = (200..300).contains(&status);

        if body.iter().all(u8::is_ascii_whitespace) {
            return Self {
                success: ok,
                status,
                message: default_message(status),
                data: None,
            };
        }

        match serde_json::from_slice::<JsonValue>(body) {
            Ok(JsonValue::Object(mut object)) if object.contains_key("success") => {
                let body_success = object
                    .get("success")
                    .and_then(JsonValue::as_bool)
                    .unwrap_or(ok);
                let message = take_message(&mut object).unwrap_or_else(|| default_message(status));
                let data = object.remove("data").filter(|d| !d.is_null());

                Self {
                    success: ok && body_success,
                    status,
                    message,
                    data,
                }
            }
            Ok(JsonValue::Object(mut object)) if !ok => Self {
                success: false,
                status,
                message: take_message(&mut object).unwrap_or_else(|| default_message(status)),
                data: None,
            },
            Ok(value) => Self {
                success: ok,
                status,
                message: default_message(status),
                data: ok.then_some(value),
            },
            Err(_) => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                if ok {
                    Self {
                        success: true,
                        status,
                        message: default_message(status),
                        data: Some(JsonValue::String(text)),
                    }
                } else {
                    Self::failure(status, text)
                }
            }
        }
    }
}

impl<T> Envelope<T> {
    /// Failed envelope with no data
    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            message: message.into(),
            data: None,
        }
    }

    /// Synthetic failure for a request that could not be completed
    pub fn network_failure(message: impl Into<String>) -> Self {
        Self::failure(NETWORK_FAILURE_STATUS, message)
    }
}

/// Tagged response handed to dashboard code
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success { status: u16, message: String, data: T },
    Failure { status: u16, message: String },
}

impl<T> ApiResponse<T> {
    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self::Failure {
            status,
            message: message.into(),
        }
    }

    /// Synthetic 500 used when the request never produced a usable response
    pub fn network_failure(error: impl std::fmt::Display) -> Self {
        Self::failure(NETWORK_FAILURE_STATUS, format!("Network error: {error}"))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. } | Self::Failure { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// Whether the backend rejected the credentials of the request
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Failure { status: 401 | 403, .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            Self::Success {
                status,
                message,
                data,
            } => ApiResponse::Success {
                status,
                message,
                data: f(data),
            },
            Self::Failure { status, message } => ApiResponse::Failure { status, message },
        }
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Convert a wire envelope, decoding `data` into the endpoint's type.
    ///
    /// A successful envelope whose data does not decode becomes a 500 failure.
    pub fn from_envelope(envelope: Envelope<JsonValue>) -> Self {
        if !envelope.success {
            return Self::Failure {
                status: envelope.status,
                message: envelope.message,
            };
        }

        let data = envelope.data.unwrap_or(JsonValue::Null);
        match serde_json::from_value::<T>(data) {
            Ok(data) => Self::Success {
                status: envelope.status,
                message: envelope.message,
                data,
            },
            Err(e) => Self::failure(
                NETWORK_FAILURE_STATUS,
                format!("Failed to parse response: {e}"),
            ),
        }
    }
}

impl<T> From<ApiResponse<T>> for Envelope<T> {
    fn from(response: ApiResponse<T>) -> Self {
        match response {
            ApiResponse::Success {
                status,
                message,
                data,
            } => Envelope {
                success: true,
                status,
                message,
                data: Some(data),
            },
            ApiResponse::Failure { status, message } => Envelope::failure(status, message),
        }
    }
}

fn take_message(object: &mut serde_json::Map<String, JsonValue>) -> Option<String> {
    ["message", "error"].iter().find_map(|key| match object.remove(*key) {
        Some(JsonValue::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn default_message(status: u16) -> String {
    if (200..300).contains(&status) {
        "Request completed successfully".to_string()
    } else {
        format!("Request failed with status {status}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_body_keeps_message_and_data() {
        let body = json!({"success": true, "message": "ok", "data": {"id": 1}}).to_string();
        let envelope = Envelope::from_upstream(200, body.as_bytes());

        assert!(envelope.success);
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.message, "ok");
        assert_eq!(envelope.data, Some(json!({"id": 1})));
    }

    #[test]
    fn upstream_status_wins_over_body_status() {
        let body = json!({"success": false, "status": 200, "message": "Token expired"}).to_string();
        let envelope = Envelope::from_upstream(401, body.as_bytes());

        assert!(!envelope.success);
        assert_eq!(envelope.status, 401);
        assert_eq!(envelope.message, "Token expired");
    }

    #[test]
    fn bare_json_becomes_data() {
        let envelope = Envelope::from_upstream(200, br#"[{"id":"a"}]"#);
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(json!([{"id": "a"}])));
    }

    #[test]
    fn bare_error_object_uses_error_field() {
        let envelope = Envelope::from_upstream(404, br#"{"error":"News not found"}"#);
        assert!(!envelope.success);
        assert_eq!(envelope.message, "News not found");
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn plain_text_error_is_the_message() {
        let envelope = Envelope::from_upstream(502, b"Bad Gateway");
        assert!(!envelope.success);
        assert_eq!(envelope.message, "Bad Gateway");
    }

    #[test]
    fn empty_body_gets_default_message() {
        let envelope = Envelope::from_upstream(204, b"");
        assert!(envelope.success);
        assert_eq!(envelope.data, None);
        assert_eq!(envelope.message, "Request completed successfully");
    }

    #[test]
    fn undecodable_data_becomes_failure() {
        let envelope = Envelope {
            success: true,
            status: 200,
            message: "ok".into(),
            data: Some(json!("not a number")),
        };
        let response: ApiResponse<u32> = ApiResponse::from_envelope(envelope);

        assert_eq!(response.status(), NETWORK_FAILURE_STATUS);
        assert!(response.message().starts_with("Failed to parse response"));
    }

    #[test]
    fn auth_failures_are_401_and_403() {
        assert!(ApiResponse::<()>::failure(401, "").is_auth_failure());
        assert!(ApiResponse::<()>::failure(403, "").is_auth_failure());
        assert!(!ApiResponse::<()>::failure(404, "").is_auth_failure());
    }

    #[test]
    fn tagged_response_serialises_as_envelope() {
        let response = ApiResponse::Success {
            status: 201,
            message: "created".to_string(),
            data: json!({"id": 3}),
        };
        let envelope: Envelope = response.into();

        assert_eq!(
            serde_json::to_value(envelope).unwrap(),
            json!({"success": true, "status": 201, "message": "created", "data": {"id": 3}})
        );
    }
}
