// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer-token authentication for the member API.
//!
//! ## Auth Flow
//!
//! 1. `POST /member/login` checks email and password, then the
//!    [`TokenProvider`] issues an HS256 JWT (`sub` = email, `iat`, `exp`)
//! 2. Clients send `Authorization: Bearer <token>` on later requests
//! 3. [`authentication_filter`] runs once per request:
//!    - validates signature and expiry through the [`TokenProvider`]
//!    - resolves the subject through the [`MemberDetailsService`]
//!    - installs the principal into the request's [`SecurityContext`], or
//!      leaves it empty on any failure
//! 4. [`enforce_access_policy`] permits preflights and public routes, and
//!    answers every other anonymous request with the [`entry_point`] 401
//! 5. Handlers read the principal with the [`Auth`] / [`AdminOnly`] extractors
//!
//! ## Security
//!
//! - No server-side session: the signing secret and token lifetime are the
//!   only shared state, both immutable after startup
//! - Token failures are never reported to clients; they differ only in logs
//! - No clock skew tolerance: a token is dead from its `exp` second onward

pub mod claims;
pub mod codec;
pub mod context;
pub mod entry_point;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod login;
pub mod password;
pub mod policy;
pub mod provider;
pub mod resolver;
pub mod roles;

#[cfg(test)]
pub mod testing;

pub use claims::{Claims, Principal};
pub use codec::{ClaimsCodec, SigningError};
pub use context::SecurityContext;
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use filter::{authentication_filter, Authenticator, FilterOutcome};
pub use login::{check_credentials, BadCredentials};
pub use password::{
    Argon2PasswordEncoder, PasswordEncoder, PasswordHashError, DUMMY_PASSWORD_HASH,
};
pub use policy::{enforce_access_policy, AccessDecision, AccessPolicy, Requirement};
pub use provider::{IssuedToken, TokenProvider};
pub use resolver::MemberDetailsService;
pub use roles::Role;
