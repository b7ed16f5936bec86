// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Member details service: subject to principal lookup.

use async_trait::async_trait;

use super::claims::Principal;

/// Loads the current principal for a token subject.
///
/// The authentication core depends only on this interface. The production
/// implementation is [`MemberRepository`](crate::storage::MemberRepository);
/// tests use in-memory stubs.
#[async_trait]
pub trait MemberDetailsService: Send + Sync {
    /// Look up the member whose login email is `subject`.
    ///
    /// `None` means no such member. Backend failures also collapse to `None`
    /// after being logged, since the caller treats both as anonymous and
    /// never retries.
    async fn load_by_subject(&self, subject: &str) -> Option<Principal>;
}
