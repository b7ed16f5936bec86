// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::auth::{entry_point::ErrorBody, BadCredentials, PasswordHashError, SigningError};
use crate::storage::StorageError;

/// Business-level API error (bad input, duplicates, missing records).
///
/// Authentication failures are not expressed with this type; they surface
/// only as the entry point's 401.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            status: self.status.as_u16(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<BadCredentials> for ApiError {
    fn from(e: BadCredentials) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::AlreadyExists(_) => {
                ApiError::bad_request("This email is already registered.")
            }
            StorageError::NotFound { entity, .. } => ApiError::not_found(format!("{entity} not found")),
            StorageError::Invalid(message) => ApiError::bad_request(message),
            other => {
                tracing::error!(error = %other, "Storage failure");
                ApiError::internal()
            }
        }
    }
}

impl From<SigningError> for ApiError {
    fn from(e: SigningError) -> Self {
        tracing::error!(error = %e, "Token issuance failed");
        ApiError::internal()
    }
}

impl From<PasswordHashError> for ApiError {
    fn from(e: PasswordHashError) -> Self {
        tracing::error!(error = %e, "Password hashing failed");
        ApiError::internal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let internal = ApiError::internal();
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"status":400,"message":"bad data"}"#);
    }

    #[test]
    fn bad_credentials_become_400() {
        let error = ApiError::from(BadCredentials);
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, "Check your email or password.");
    }

    #[test]
    fn duplicate_member_becomes_400() {
        let error = ApiError::from(StorageError::AlreadyExists("kim@example.com".into()));
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_records_name_the_entity() {
        let error = ApiError::from(StorageError::not_found("Store", 7));
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.message, "Store not found");
    }

    #[test]
    fn store_failures_hide_details() {
        let json_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error = ApiError::from(StorageError::Serde(json_error));
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Internal server error");
    }
}
