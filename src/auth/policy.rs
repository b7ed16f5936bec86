// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route-level access policy.
//!
//! An ordered table of `(pattern, requirement)` rules evaluated first-match
//! wins after the authentication filter has run. CORS preflight requests are
//! permitted before any rule is consulted, and the table always ends with a
//! catch-all rule requiring authentication.
//!
//! ## Pattern Syntax
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `/member/login` | exactly that path |
//! | `/member/*` | `/member/` plus exactly one segment |
//! | `/store/**` | `/store` and everything below it |
//!
//! Empty segments are ignored on both sides, so trailing slashes do not
//! matter.

use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{
        header::{ACCESS_CONTROL_REQUEST_METHOD, ORIGIN},
        HeaderMap, Method,
    },
    middleware::Next,
    response::Response,
};

use super::{context::SecurityContext, entry_point};

/// Paths reachable without authentication, in evaluation order.
pub const PUBLIC_PATHS: &[&str] = &[
    "/member/pwUpdate",
    "/store/**",
    "/member/join",
    "/member/login",
    "/member/findEmail",
    "/member/findPassword",
    "/member/findAll",
    "/member/totalCount",
    "/health/**",
    "/docs/**",
    "/api-doc/**",
];

/// What a matched route demands of the security context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
}

/// Outcome of evaluating the policy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Permit,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern must start with '/': {0}")]
    NotAbsolute(String),
    #[error("wildcards are only allowed as the last segment: {0}")]
    MisplacedWildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tail {
    Exact,
    OneSegment,
    AnyDepth,
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    prefix: Vec<String>,
    tail: Tail,
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        let segments: Vec<&str> = segments(path).collect();
        if segments.len() < self.prefix.len() {
            return false;
        }
        if !self.prefix.iter().zip(&segments).all(|(p, s)| p == s) {
            return false;
        }

        let rest = segments.len() - self.prefix.len();
        match self.tail {
            Tail::Exact => rest == 0,
            Tail::OneSegment => rest == 1,
            Tail::AnyDepth => true,
        }
    }
}

impl FromStr for PathPattern {
    type Err = PatternError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if !raw.starts_with('/') {
            return Err(PatternError::NotAbsolute(raw.to_string()));
        }

        let mut prefix: Vec<String> = segments(raw).map(str::to_string).collect();
        let tail = match prefix.last().map(String::as_str) {
            Some("**") => Tail::AnyDepth,
            Some("*") => Tail::OneSegment,
            _ => Tail::Exact,
        };
        if tail != Tail::Exact {
            prefix.pop();
        }
        if prefix.iter().any(|segment| segment.contains('*')) {
            return Err(PatternError::MisplacedWildcard(raw.to_string()));
        }

        Ok(Self {
            prefix,
            tail,
        })
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Whether the request is a CORS preflight.
///
/// `OPTIONS` alone is not enough; the browser also sends `Origin` and
/// `Access-Control-Request-Method`.
pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(ORIGIN)
        && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

/// Ordered first-match-wins access rules.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<(PathPattern, Requirement)>,
}

impl AccessPolicy {
    /// Build a policy from ordered rules; a catch-all `/**` requiring
    /// authentication is appended.
    pub fn new<'a>(
        rules: impl IntoIterator<Item = (&'a str, Requirement)>,
    ) -> Result<Self, PatternError> {
        let mut parsed = rules
            .into_iter()
            .map(|(pattern, requirement)| Ok((pattern.parse()?, requirement)))
            .collect::<Result<Vec<_>, PatternError>>()?;
        parsed.push(("/**".parse()?, Requirement::Authenticated));
        Ok(Self { rules: parsed })
    }

    /// Policy permitting [`PUBLIC_PATHS`] and protecting everything else.
    pub fn member_defaults() -> Result<Self, PatternError> {
        Self::new(
            PUBLIC_PATHS
                .iter()
                .map(|pattern| (*pattern, Requirement::Public)),
        )
    }

    /// Requirement of the first rule matching `path`.
    pub fn requirement_for(&self, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, requirement)| *requirement)
            .unwrap_or(Requirement::Authenticated)
    }

    /// Decide whether a request may proceed.
    pub fn decide(
        &self,
        method: &Method,
        headers: &HeaderMap,
        path: &str,
        context: &SecurityContext,
    ) -> AccessDecision {
        if is_preflight(method, headers) {
            return AccessDecision::Permit;
        }

        match self.requirement_for(path) {
            Requirement::Public => AccessDecision::Permit,
            Requirement::Authenticated if context.is_authenticated() => AccessDecision::Permit,
            Requirement::Authenticated => AccessDecision::Reject,
        }
    }
}

/// Access policy middleware function.
///
/// Must be layered inside [`authentication_filter`](super::authentication_filter).
/// A request without a security context is treated as anonymous.
pub async fn enforce_access_policy(
    State(policy): State<Arc<AccessPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let anonymous = SecurityContext::anonymous();
    let context = request
        .extensions()
        .get::<SecurityContext>()
        .unwrap_or(&anonymous);

    let decision = policy.decide(request.method(), request.headers(), request.uri().path(), context);
    match decision {
        AccessDecision::Permit => next.run(request).await,
        AccessDecision::Reject => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                "Unauthenticated request to protected route"
            );
            entry_point::unauthorized()
        }
    }
}
