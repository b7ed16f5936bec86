// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::auth::{
    AccessPolicy, Authenticator, MemberDetailsService, PasswordEncoder, TokenProvider,
};
use crate::storage::{MemberRepository, StoreRepository};

/// Shared, read-only handles given to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub members: Arc<MemberRepository>,
    pub stores: Arc<StoreRepository>,
    pub tokens: Arc<TokenProvider>,
    pub passwords: Arc<dyn PasswordEncoder>,
    pub policy: Arc<AccessPolicy>,
    /// Emails granted the admin authority when they sign up.
    pub admin_emails: Arc<BTreeSet<String>>,
}

impl AppState {
    pub fn new(
        members: MemberRepository,
        stores: StoreRepository,
        tokens: TokenProvider,
        passwords: Arc<dyn PasswordEncoder>,
        policy: AccessPolicy,
        admin_emails: BTreeSet<String>,
    ) -> Self {
        Self {
            members: Arc::new(members),
            stores: Arc::new(stores),
            tokens: Arc::new(tokens),
            passwords,
            policy: Arc::new(policy),
            admin_emails: Arc::new(admin_emails),
        }
    }

    /// The authentication filter's view of this state.
    pub fn authenticator(&self) -> Authenticator {
        let members: Arc<dyn MemberDetailsService> = self.members.clone();
        Authenticator::new(self.tokens.clone(), members)
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.contains(email)
    }
}
