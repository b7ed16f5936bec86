// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication filter for Axum.
//!
//! Runs once per request, ahead of the access policy and of routing. It only
//! ever *authenticates*: a missing, malformed, forged or expired token, or a
//! subject that no longer exists, leaves the request anonymous and the chain
//! continues. Whether an anonymous request may proceed is decided later by
//! [`AccessPolicy`](super::AccessPolicy).
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/member/me", get(me))
//!     .layer(axum::middleware::from_fn_with_state(
//!         authenticator,
//!         authentication_filter,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::{
    claims::Principal, context::SecurityContext, provider::TokenProvider,
    resolver::MemberDetailsService, AuthError,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Result of authenticating one request.
///
/// There is no rejecting outcome here; rejection belongs to the access
/// policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Continue without a principal. `reason` is `None` when no credential was
    /// presented at all.
    ProceedAnonymous { reason: Option<AuthError> },
    /// Continue with this principal installed in the security context.
    ProceedAuthenticated(Principal),
}

impl FilterOutcome {
    pub fn into_security_context(self) -> SecurityContext {
        match self {
            FilterOutcome::ProceedAnonymous { .. } => SecurityContext::anonymous(),
            FilterOutcome::ProceedAuthenticated(principal) => {
                SecurityContext::authenticated(principal)
            }
        }
    }
}

/// Extract the bearer token from the `Authorization` header.
///
/// The scheme name is matched case-insensitively. Absent headers, other
/// schemes, non-UTF-8 values and empty tokens all yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let scheme = value.get(..BEARER_PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }

    let token = value[BEARER_PREFIX.len()..].trim();
    (!token.is_empty()).then_some(token)
}

/// Token provider and member lookup used by the filter.
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<TokenProvider>,
    members: Arc<dyn MemberDetailsService>,
}

impl Authenticator {
    pub fn new(tokens: Arc<TokenProvider>, members: Arc<dyn MemberDetailsService>) -> Self {
        Self { tokens, members }
    }

    /// Decide the outcome for a request carrying `headers`.
    pub async fn authenticate(&self, headers: &HeaderMap) -> FilterOutcome {
        let Some(token) = bearer_token(headers) else {
            return FilterOutcome::ProceedAnonymous { reason: None };
        };

        let subject = match self.tokens.validate(token) {
            Ok(subject) => subject,
            Err(reason) => return FilterOutcome::ProceedAnonymous { reason: Some(reason) },
        };

        match self.members.load_by_subject(&subject).await {
            Some(principal) => FilterOutcome::ProceedAuthenticated(principal),
            None => FilterOutcome::ProceedAnonymous {
                reason: Some(AuthError::PrincipalNotFound),
            },
        }
    }
}

/// Authentication middleware function.
///
/// Always inserts a [`SecurityContext`] into the request extensions and always
/// calls the next stage. A request that already carries a context is passed
/// through untouched, so the filter takes effect at most once per request.
pub async fn authentication_filter(
    State(authenticator): State<Authenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<SecurityContext>().is_some() {
        return next.run(request).await;
    }

    let outcome = authenticator.authenticate(request.headers()).await;
    match &outcome {
        FilterOutcome::ProceedAnonymous { reason: Some(reason) } => {
            tracing::debug!(
                reason = reason.error_code(),
                path = %request.uri().path(),
                "Bearer token not accepted, continuing anonymously"
            );
        }
        FilterOutcome::ProceedAnonymous { reason: None } => {}
        FilterOutcome::ProceedAuthenticated(principal) => {
            tracing::debug!(subject = principal.subject(), "Request authenticated");
        }
    }

    request
        .extensions_mut()
        .insert(outcome.into_security_context());
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::StubMembers;
    use axum::{
        body::Body, http::HeaderValue, http::StatusCode, middleware::from_fn_with_state,
        routing::get, Extension, Router,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    const SECRET: &[u8] = b"filter-test-secret-0123456789abcd";

    fn authenticator() -> (Authenticator, Arc<TokenProvider>) {
        let tokens = Arc::new(TokenProvider::new(SECRET, Duration::hours(2)));
        let members = StubMembers::with("kim@example.com", "hash");
        (Authenticator::new(tokens.clone(), Arc::new(members)), tokens)
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers_with("Bearer   padded  ")), Some("padded"));
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers_with("abc.def.ghi")), None);
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers_with("bearer xyz")), Some("xyz"));
        assert_eq!(bearer_token(&headers_with("BEARER xyz")), Some("xyz"));
        assert_eq!(bearer_token(&headers_with("bEaReR xyz")), Some("xyz"));
        assert_eq!(bearer_token(&headers_with("Bearerxyz")), None);
        assert_eq!(bearer_token(&headers_with("Bear")), None);
    }

    #[tokio::test]
    async fn no_header_proceeds_anonymous_without_reason() {
        let (auth, _) = authenticator();
        assert_eq!(
            auth.authenticate(&HeaderMap::new()).await,
            FilterOutcome::ProceedAnonymous { reason: None }
        );
    }

    #[tokio::test]
    async fn valid_token_proceeds_authenticated() {
        let (auth, tokens) = authenticator();
        let issued = tokens.issue("kim@example.com").unwrap();

        let outcome = auth
            .authenticate(&headers_with(&format!("Bearer {}", issued.token)))
            .await;
        match outcome {
            FilterOutcome::ProceedAuthenticated(principal) => {
                assert_eq!(principal.subject(), "kim@example.com")
            }
            other => panic!("expected authenticated outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn every_validation_failure_proceeds_anonymous() {
        let (auth, tokens) = authenticator();
        let expired = tokens
            .issue_at("kim@example.com", Utc::now() - Duration::days(1))
            .unwrap()
            .token;
        let foreign = TokenProvider::new(b"some-other-secret-0123456789abcde", Duration::hours(2))
            .issue("kim@example.com")
            .unwrap()
            .token;
        let orphan = tokens.issue("deleted@example.com").unwrap().token;

        let cases = [
            ("garbage".to_string(), AuthError::MalformedToken),
            (foreign, AuthError::SignatureMismatch),
            (expired, AuthError::Expired),
            (orphan, AuthError::PrincipalNotFound),
        ];

        for (token, expected) in cases {
            let outcome = auth
                .authenticate(&headers_with(&format!("Bearer {token}")))
                .await;
            assert_eq!(
                outcome,
                FilterOutcome::ProceedAnonymous {
                    reason: Some(expected)
                }
            );
        }
    }

    async fn echo_context(Extension(context): Extension<SecurityContext>) -> String {
        context
            .principal()
            .map(|p| p.subject().to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }

    fn app(auth: Authenticator) -> Router {
        Router::new()
            .route("/echo", get(echo_context))
            .layer(from_fn_with_state(auth, authentication_filter))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn middleware_never_short_circuits() {
        let (auth, _) = authenticator();
        let request = axum::http::Request::builder()
            .uri("/echo")
            .header(AUTHORIZATION, "Bearer forged.token.value")
            .body(Body::empty())
            .unwrap();

        let response = app(auth).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "anonymous");
    }

    #[tokio::test]
    async fn middleware_installs_principal() {
        let (auth, tokens) = authenticator();
        let issued = tokens.issue("kim@example.com").unwrap();
        let request = axum::http::Request::builder()
            .uri("/echo")
            .header(AUTHORIZATION, format!("Bearer {}", issued.token))
            .body(Body::empty())
            .unwrap();

        let response = app(auth).oneshot(request).await.unwrap();
        assert_eq!(body_text(response).await, "kim@example.com");
    }

    #[tokio::test]
    async fn existing_context_is_left_alone() {
        let (auth, tokens) = authenticator();
        let issued = tokens.issue("kim@example.com").unwrap();
        let mut request = axum::http::Request::builder()
            .uri("/echo")
            .header(AUTHORIZATION, format!("Bearer {}", issued.token))
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(SecurityContext::anonymous());

        let response = app(auth).oneshot(request).await.unwrap();
        assert_eq!(body_text(response).await, "anonymous");
    }
}
