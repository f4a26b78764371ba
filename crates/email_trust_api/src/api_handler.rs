//! Shared API types and utilities
//!
//! Request payloads, the error type every handler returns, and its JSON
//! rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{
    de::{IgnoredAny, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::fmt;
use uuid::Uuid;

/// Request body for POST /validate
///
/// Only a JSON object is accepted. Unknown keys are ignored, and a missing
/// `email` is treated as empty.
#[derive(Debug)]
pub struct ValidateRequest {
    pub email: String,
}

impl<'de> Deserialize<'de> for ValidateRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RequestVisitor;

        impl<'de> Visitor<'de> for RequestVisitor {
            type Value = ValidateRequest;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with an \"email\" string")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut email = String::new();
                while let Some(key) = map.next_key::<String>()? {
                    if key == "email" {
                        // Repeated keys: the last one wins
                        email = map.next_value()?;
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(ValidateRequest { email })
            }
        }

        deserializer.deserialize_map(RequestVisitor)
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    pub request_id: String,
    pub timestamp: String,
}

/// Result type for API handlers
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// API error types
#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    /// Body missing, not JSON, or not the expected shape
    InvalidRequest,
    EmptyEmail,
    /// Address failed the syntactic check
    InvalidEmail,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            ApiError::InvalidRequest => (
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST",
                "Invalid request payload",
            ),
            ApiError::EmptyEmail => (StatusCode::BAD_REQUEST, "EMPTY_EMAIL", "Email cannot be empty"),
            ApiError::InvalidEmail => (
                StatusCode::BAD_REQUEST,
                "INVALID_EMAIL",
                "Invalid email format",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.parts();

        let error_response = ErrorResponse {
            error: message.to_string(),
            error_code: error_code.to_string(),
            request_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_request_deserialization() {
        let request: ValidateRequest = serde_json::from_str(r#"{"email":"a@b.io"}"#).unwrap();
        assert_eq!(request.email, "a@b.io");

        let request: ValidateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.email, "");

        let request: ValidateRequest =
            serde_json::from_str(r#"{"name":"x","email":"a@b.io","tags":[1]}"#).unwrap();
        assert_eq!(request.email, "a@b.io");

        assert!(serde_json::from_str::<ValidateRequest>(r#"{"email":42}"#).is_err());
    }

    #[test]
    fn test_validate_request_must_be_object() {
        for body in [r#"["a@b.io"]"#, "[]", r#""a@b.io""#, "null", "7"] {
            assert!(
                serde_json::from_str::<ValidateRequest>(body).is_err(),
                "body: {body}"
            );
        }
    }

    #[test]
    fn test_error_status_codes() {
        for error in [ApiError::InvalidRequest, ApiError::EmptyEmail, ApiError::InvalidEmail] {
            assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ApiError::EmptyEmail.parts().2, "Email cannot be empty");
        assert_eq!(ApiError::InvalidEmail.parts().1, "INVALID_EMAIL");
        assert_eq!(ApiError::InvalidRequest.parts().2, "Invalid request payload");
    }
}
