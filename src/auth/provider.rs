// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and validation.

use chrono::{DateTime, Duration, Utc};

use super::{
    claims::Claims,
    codec::{ClaimsCodec, SigningError},
    AuthError,
};

/// A freshly issued token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues tokens at login and validates them on every request.
///
/// Holds a read-only codec and a fixed lifetime, both set once at startup.
/// Every operation is a pure function of its input, the secret and the
/// supplied clock reading, so the provider is shared across requests without
/// locking.
#[derive(Clone)]
pub struct TokenProvider {
    codec: ClaimsCodec,
    lifetime: Duration,
}

impl TokenProvider {
    /// Create a provider signing with `secret`.
    ///
    /// `lifetime` must be positive; [`AppConfig`](crate::config::AppConfig)
    /// rejects anything else before a provider is built.
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            codec: ClaimsCodec::new(secret),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `subject` valid from now for the configured lifetime.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, SigningError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<IssuedToken, SigningError> {
        let claims = Claims::new(subject, now, self.lifetime);
        let token = self.codec.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Validate `token` and return its subject.
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate `token` against the clock reading `now`.
    ///
    /// This is the only place expiry is checked.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = self.codec.decode(token)?;
        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"provider-test-secret-0123456789ab";

    fn provider() -> TokenProvider {
        TokenProvider::new(SECRET, Duration::hours(2))
    }

    #[test]
    fn validate_returns_subject_of_issued_token() {
        let provider = provider();
        for subject in ["kim@example.com", "lee@example.org", "x"] {
            let issued = provider.issue(subject).unwrap();
            assert_eq!(provider.validate(&issued.token), Ok(subject.to_string()));
        }
    }

    #[test]
    fn issued_claims_span_the_lifetime() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let issued = provider().issue_at("kim@example.com", now).unwrap();
        assert_eq!(issued.claims.iat, 1_700_000_000);
        assert_eq!(issued.claims.exp, 1_700_000_000 + 7200);
    }

    #[test]
    fn token_is_valid_until_just_before_expiry() {
        let provider = provider();
        let now = Utc::now();
        let issued = provider.issue_at("kim@example.com", now).unwrap();

        let last_valid = now + provider.lifetime() - Duration::seconds(1);
        assert_eq!(
            provider.validate_at(&issued.token, last_valid),
            Ok("kim@example.com".to_string())
        );
    }

    #[test]
    fn token_past_lifetime_is_expired() {
        let provider = provider();
        let now = Utc::now();
        let issued = provider.issue_at("kim@example.com", now).unwrap();

        let at_expiry = now + provider.lifetime();
        let after_expiry = at_expiry + Duration::seconds(1);
        assert_eq!(provider.validate_at(&issued.token, at_expiry), Err(AuthError::Expired));
        assert_eq!(provider.validate_at(&issued.token, after_expiry), Err(AuthError::Expired));
    }

    #[test]
    fn token_issued_long_ago_is_expired_now() {
        let provider = provider();
        let issued = provider
            .issue_at("kim@example.com", Utc::now() - Duration::days(1))
            .unwrap();
        assert_eq!(provider.validate(&issued.token), Err(AuthError::Expired));
    }

    #[test]
    fn signature_is_checked_before_expiry() {
        let issued = provider()
            .issue_at("kim@example.com", Utc::now() - Duration::days(1))
            .unwrap();
        let other = TokenProvider::new(b"a-different-secret-0123456789abcd", Duration::hours(2));
        assert_eq!(other.validate(&issued.token), Err(AuthError::SignatureMismatch));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(provider().validate("not-a-token"), Err(AuthError::MalformedToken));
    }
}
