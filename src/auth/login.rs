// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential check performed by the login endpoint before a token is issued.

use super::{
    claims::Principal,
    password::{PasswordEncoder, DUMMY_PASSWORD_HASH},
};

/// Email or password did not match.
///
/// A single variant on purpose: callers must not reveal which half failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Check your email or password.")]
pub struct BadCredentials;

/// Verify `password` for the member looked up by email.
///
/// The lookup itself belongs to the caller so that storage failures surface
/// as such. When no member was found the password is still run through the
/// encoder against [`DUMMY_PASSWORD_HASH`], keeping both rejections equally
/// slow.
pub fn check_credentials(
    passwords: &dyn PasswordEncoder,
    candidate: Option<Principal>,
    password: &str,
) -> Result<Principal, BadCredentials> {
    let Some(principal) = candidate else {
        let _ = passwords.matches(password, DUMMY_PASSWORD_HASH);
        tracing::debug!("Login rejected: unknown email");
        return Err(BadCredentials);
    };

    if !passwords.matches(password, principal.password_hash()) {
        tracing::debug!("Login rejected: password mismatch");
        return Err(BadCredentials);
    }

    Ok(principal)
}
