// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Entry point for unauthenticated requests to protected routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// The only message ever returned for a missing or unusable token.
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";

/// JSON body shared by every error response: `{ "status", "message" }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// HTTP status code
    pub status: u16,
    /// Human-readable message
    pub message: String,
}

/// 401 response sent when the access policy rejects a request.
///
/// The body is identical for "no token", "bad signature", "expired" and
/// "unknown subject".
pub fn unauthorized() -> Response {
    let status = StatusCode::UNAUTHORIZED;
    let body = Json(ErrorBody {
        status: status.as_u16(),
        message: UNAUTHORIZED_MESSAGE.to_string(),
    });
    (status, body).into_response()
}
