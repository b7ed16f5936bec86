// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

/// Reasons a bearer token could not authenticate a request.
///
/// These never reach the client. The authentication filter downgrades every
/// variant to an anonymous request, and the only externally visible failure
/// is the uniform 401 from the entry point. They exist for diagnosis in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Token does not have the expected structure, uses an unexpected
    /// algorithm, or carries undecodable segments
    MalformedToken,
    /// Recomputed signature differs from the supplied one
    SignatureMismatch,
    /// Token is past its `exp` claim
    Expired,
    /// Subject in a valid token has no matching member
    PrincipalNotFound,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedToken => "malformed_token",
            AuthError::SignatureMismatch => "signature_mismatch",
            AuthError::Expired => "token_expired",
            AuthError::PrincipalNotFound => "principal_not_found",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::SignatureMismatch => write!(f, "Token signature does not match"),
            AuthError::Expired => write!(f, "Token has expired"),
            AuthError::PrincipalNotFound => write!(f, "No member matches the token subject"),
        }
    }
}

impl std::error::Error for AuthError {}
