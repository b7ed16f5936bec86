// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage
//!
//! Members and the store directory, each in its own redb file.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   members.redb      # members table, keyed by login email
//!   stores.redb       # stores and their score tallies, keyed by store id
//! ```
//!
//! The member repository also answers subject lookups for the authentication
//! filter through [`MemberDetailsService`](crate::auth::MemberDetailsService).

pub mod error;
pub mod members;
pub mod stores;

pub use error::{StorageError, StorageResult};
pub use members::{join_rrn, Member, MemberRepository};
pub use stores::{RatedStore, ScoreTally, Store, StoreDetails, StoreRepository};

/// File name of the member database inside the data directory.
pub const MEMBERS_DB_FILE: &str = "members.redb";

/// File name of the store database inside the data directory.
pub const STORES_DB_FILE: &str = "stores.redb";
