// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request security context.

use super::claims::Principal;

/// Request-scoped slot holding at most one [`Principal`].
///
/// Lives in the request's extensions: inserted by the authentication filter
/// (empty when the request stays anonymous), read by the access policy and
/// handler extractors, and dropped together with the request. Nothing about
/// it is shared between requests.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn into_principal(self) -> Option<Principal> {
        self.principal
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}
