// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory collaborators for exercising the auth core without storage or
//! real hashing.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{
    claims::Principal,
    password::{PasswordEncoder, PasswordHashError},
    resolver::MemberDetailsService,
    roles::Role,
};

/// Member lookup backed by a fixed map of subject to principal.
#[derive(Default)]
pub struct StubMembers {
    principals: HashMap<String, Principal>,
}

impl StubMembers {
    pub fn with(subject: &str, password_hash: &str) -> Self {
        Self::default().and(subject, password_hash, [])
    }

    pub fn and(
        mut self,
        subject: &str,
        password_hash: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        self.principals.insert(
            subject.to_string(),
            Principal::new(subject, password_hash, roles),
        );
        self
    }
}

#[async_trait]
impl MemberDetailsService for StubMembers {
    async fn load_by_subject(&self, subject: &str) -> Option<Principal> {
        self.principals.get(subject).cloned()
    }
}

/// "Hashes" by prefixing `plain:`.
pub struct PlainPasswords;

impl PasswordEncoder for PlainPasswords {
    fn encode(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        Ok(format!("plain:{plaintext}"))
    }

    fn matches(&self, plaintext: &str, hash: &str) -> bool {
        hash.strip_prefix("plain:") == Some(plaintext)
    }
}
