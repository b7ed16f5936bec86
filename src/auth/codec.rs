// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims codec: claims to and from a signed compact JWT.
//!
//! Tokens are `header.payload.signature`, each segment base64url without
//! padding, signed with HS256 over `header.payload`. The codec only checks
//! shape and signature. Expiry is deliberately left to
//! [`TokenProvider`](super::TokenProvider), which owns the clock.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::{claims::Claims, AuthError};

/// Signing algorithm used for every token.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Failure to produce a token.
///
/// Not expected for well-formed claims; surfaced as an internal error by the
/// caller.
#[derive(Debug, thiserror::Error)]
#[error("token signing failed: {0}")]
pub struct SigningError(#[from] jsonwebtoken::errors::Error);

/// Encodes and decodes [`Claims`] with a shared HMAC secret.
#[derive(Clone)]
pub struct ClaimsCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    /// Same checks without the signature, to locate a decoding failure.
    unsigned: Validation,
}

impl ClaimsCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let mut unsigned = validation.clone();
        unsigned.insecure_disable_signature_validation();

        Self {
            header: Header::new(SIGNING_ALGORITHM),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            unsigned,
        }
    }

    /// Serialize and sign `claims`.
    ///
    /// Deterministic for identical claims and secret.
    pub fn encode(&self, claims: &Claims) -> Result<String, SigningError> {
        Ok(encode(&self.header, claims, &self.encoding_key)?)
    }

    /// Verify the signature of `token` and return its claims.
    ///
    /// Returns [`AuthError::SignatureMismatch`] when the signature does not
    /// verify under this codec's secret, including a signature segment that
    /// is not even valid base64 behind a sound header and payload. Every
    /// structural problem in header or payload (segment count, base64, JSON,
    /// algorithm, missing claims, `exp <= iat`) is [`AuthError::MalformedToken`].
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(token_data) => token_data.claims,
            Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => {
                return Err(AuthError::SignatureMismatch)
            }
            Err(_) => return Err(self.classify_failure(token)),
        };

        if claims.exp <= claims.iat {
            return Err(AuthError::MalformedToken);
        }

        Ok(claims)
    }

    /// A token whose header and payload decode cleanly failed in its
    /// signature segment.
    fn classify_failure(&self, token: &str) -> AuthError {
        match decode::<Claims>(token, &self.decoding_key, &self.unsigned) {
            Ok(token_data) if token_data.header.alg == SIGNING_ALGORITHM => {
                AuthError::SignatureMismatch
            }
            _ => AuthError::MalformedToken,
        }
    }
}
