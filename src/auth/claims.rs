// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the resolved principal.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::roles::Role;

/// Identity payload carried inside a token.
///
/// Timestamps are Unix seconds. A well-formed set of claims always has
/// `exp > iat`; the token is usable while the current time is before `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the member's login email
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// Build claims for `subject` issued at `issued_at` and living `lifetime`.
    pub fn new(subject: impl Into<String>, issued_at: DateTime<Utc>, lifetime: chrono::Duration) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: subject.into(),
            iat,
            exp: iat + lifetime.num_seconds(),
        }
    }

    /// Whether the claims are expired at `now` (`now >= exp`).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Expiration as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// The identity installed into the security context of an authenticated
/// request.
///
/// Built fresh for every request by the member details service from the
/// subject of a validated token, and dropped with the request. The password
/// hash is only reachable through [`Principal::password_hash`] and never
/// serialized or printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    subject: String,
    password_hash: String,
    authorities: BTreeSet<Role>,
}

impl Principal {
    pub fn new(
        subject: impl Into<String>,
        password_hash: impl Into<String>,
        authorities: impl IntoIterator<Item = Role>,
    ) -> Self {
        let mut authorities: BTreeSet<Role> = authorities.into_iter().collect();
        authorities.insert(Role::Member);
        Self {
            subject: subject.into(),
            password_hash: password_hash.into(),
            authorities,
        }
    }

    /// Member email the principal was resolved from.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn authorities(&self) -> &BTreeSet<Role> {
        &self.authorities
    }

    /// Check if any granted authority covers the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.authorities.iter().any(|role| role.has_privilege(required))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("subject", &self.subject)
            .field("password_hash", &"<redacted>")
            .field("authorities", &self.authorities)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn issued() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn new_claims_expire_after_lifetime() {
        let claims = Claims::new("kim@example.com", issued(), Duration::hours(2));
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_007_200);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let claims = Claims::new("kim@example.com", issued(), Duration::seconds(60));
        assert!(!claims.is_expired_at(issued() + Duration::seconds(59)));
        assert!(claims.is_expired_at(issued() + Duration::seconds(60)));
        assert!(claims.is_expired_at(issued() + Duration::seconds(61)));
    }

    #[test]
    fn principal_always_holds_member_authority() {
        let principal = Principal::new("kim@example.com", "$argon2id$x", []);
        assert!(principal.authorities().contains(&Role::Member));
        assert!(!principal.is_admin());

        let admin = Principal::new("root@example.com", "$argon2id$y", [Role::Admin]);
        assert!(admin.is_admin());
        assert!(admin.has_role(Role::Member));
    }

    #[test]
    fn debug_redacts_password_hash() {
        let principal = Principal::new("kim@example.com", "$argon2id$secret", []);
        let printed = format!("{principal:?}");
        assert!(printed.contains("kim@example.com"));
        assert!(!printed.contains("secret"));
    }
}
