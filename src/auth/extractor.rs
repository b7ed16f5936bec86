// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors reading the security context.
//!
//! Use the `Auth` extractor in handlers behind the access policy:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is the member resolved for this request
//! }
//! ```
//!
//! None of these re-validate tokens. They only read what the authentication
//! filter installed.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

use super::{claims::Principal, context::SecurityContext, entry_point};
use crate::error::ApiError;

fn principal_from(parts: &Parts) -> Option<Principal> {
    parts
        .extensions
        .get::<SecurityContext>()
        .and_then(|context| context.principal().cloned())
}

/// Rejection for extractors that need a principal.
#[derive(Debug)]
pub enum AccessRejection {
    /// No principal in the security context
    Unauthenticated,
    /// Principal lacks the required authority
    Forbidden,
}

impl IntoResponse for AccessRejection {
    fn into_response(self) -> Response {
        match self {
            AccessRejection::Unauthenticated => entry_point::unauthorized(),
            AccessRejection::Forbidden => ApiError::new(
                StatusCode::FORBIDDEN,
                "Insufficient permissions for this operation",
            )
            .into_response(),
        }
    }
}

/// Extractor for the authenticated principal.
///
/// The access policy already rejects anonymous requests to protected routes;
/// this rejects with the same 401 if a handler is ever reachable without one.
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AccessRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_from(parts)
            .map(Auth)
            .ok_or(AccessRejection::Unauthenticated)
    }
}

/// Extractor that requires the admin authority.
pub struct AdminOnly(pub Principal);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AccessRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(principal) = Auth::from_request_parts(parts, state).await?;

        if !principal.is_admin() {
            return Err(AccessRejection::Forbidden);
        }

        Ok(AdminOnly(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use axum::http::Request;

    fn parts_with(context: Option<SecurityContext>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(context) = context {
            parts.extensions.insert(context);
        }
        parts
    }

    fn member() -> SecurityContext {
        SecurityContext::authenticated(Principal::new("kim@example.com", "hash", []))
    }

    fn admin() -> SecurityContext {
        SecurityContext::authenticated(Principal::new("root@example.com", "hash", [Role::Admin]))
    }

    #[tokio::test]
    async fn auth_reads_principal_from_context() {
        let mut parts = parts_with(Some(member()));
        let Auth(principal) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(principal.subject(), "kim@example.com");
    }

    #[tokio::test]
    async fn auth_rejects_anonymous_context() {
        let mut parts = parts_with(Some(SecurityContext::anonymous()));
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AccessRejection::Unauthenticated)));
    }

    #[tokio::test]
    async fn auth_rejects_missing_context() {
        let mut parts = parts_with(None);
        let rejection = Auth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let mut parts = parts_with(Some(member()));
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AccessRejection::Forbidden)));
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let mut parts = parts_with(Some(admin()));
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }
}
