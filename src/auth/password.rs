// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing.
//!
//! Used by sign-up, login and password changes. The request filter never
//! touches passwords.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Well-formed Argon2id hash that no password produces.
///
/// Verified against when a login names an unknown email. It carries the same
/// cost parameters as [`Argon2PasswordEncoder`] output.
pub const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hashing failure (parameter or RNG problems, never a wrong password).
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(String);

/// Hashes and verifies member passwords.
pub trait PasswordEncoder: Send + Sync {
    /// Hash `plaintext` into a self-describing string suitable for storage.
    fn encode(&self, plaintext: &str) -> Result<String, PasswordHashError>;

    /// Whether `plaintext` matches the stored `hash`.
    ///
    /// Unparsable hashes never match.
    fn matches(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id with OWASP recommended parameters (19 MiB, 2 iterations, 1 lane).
#[derive(Debug, Clone)]
pub struct Argon2PasswordEncoder {
    argon2: Argon2<'static>,
}

impl Argon2PasswordEncoder {
    pub fn new() -> Result<Self, PasswordHashError> {
        let params = Params::new(19_456, 2, 1, None).map_err(|e| {
            tracing::error!(error = %e, "Failed to create Argon2 parameters");
            PasswordHashError(e.to_string())
        })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing operation failed");
                PasswordHashError(e.to_string())
            })
    }

    fn matches(&self, plaintext: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is not a valid PHC string");
                return false;
            }
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
