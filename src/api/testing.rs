// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Application state for handler and router tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Duration;

use crate::auth::{testing::PlainPasswords, AccessPolicy, TokenProvider};
use crate::state::AppState;
use crate::storage::{MemberRepository, StoreRepository, MEMBERS_DB_FILE, STORES_DB_FILE};

pub const TEST_SECRET: &[u8] = b"router-test-secret-0123456789abcdef";
pub const TEST_ADMIN: &str = "root@example.com";

/// State over a fresh database in a temp dir; keep the dir alive for the test.
pub fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let members = MemberRepository::open(&dir.path().join(MEMBERS_DB_FILE)).unwrap();
    let stores = StoreRepository::open(&dir.path().join(STORES_DB_FILE)).unwrap();
    let state = AppState::new(
        members,
        stores,
        TokenProvider::new(TEST_SECRET, Duration::seconds(7200)),
        Arc::new(PlainPasswords),
        AccessPolicy::member_defaults().unwrap(),
        BTreeSet::from([TEST_ADMIN.to_string()]),
    );
    (state, dir)
}
