// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded member database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `members`: login email → serialized [`Member`] (JSON bytes)
//!
//! Lookups other than by email scan the table; the member base of this
//! service is small enough that no secondary index is kept.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{StorageError, StorageResult};
use crate::auth::{MemberDetailsService, Principal, Role};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: email → serialized Member (JSON bytes).
const MEMBERS: TableDefinition<&str, &[u8]> = TableDefinition::new("members");

const MEMBER: &str = "Member";

// =============================================================================
// Member
// =============================================================================

/// A registered member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    /// Login email, unique; also the token subject
    pub email: String,
    /// PHC-format password hash
    pub password_hash: String,
    pub name: String,
    /// Resident registration number, stored as `front-back`
    pub rrn: String,
    /// Phone number
    pub number: String,
    pub roles: BTreeSet<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
        rrn: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            name: name.into(),
            rrn: rrn.into(),
            number: number.into(),
            roles: BTreeSet::from([Role::Member]),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    /// Principal for the security context of a request made by this member.
    pub fn to_principal(&self) -> Principal {
        Principal::new(
            self.email.as_str(),
            self.password_hash.as_str(),
            self.roles.iter().copied(),
        )
    }
}

/// Join the two halves of a resident registration number.
pub fn join_rrn(front: &str, back: &str) -> String {
    format!("{front}-{back}")
}

// =============================================================================
// MemberRepository
// =============================================================================

/// Member persistence.
pub struct MemberRepository {
    db: Database,
}

impl MemberRepository {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(MEMBERS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub fn exists_by_email(&self, email: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MEMBERS)?;
        Ok(table.get(email)?.is_some())
    }

    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<Member>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MEMBERS)?;
        match table.get(email)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn find_by_name_and_rrn(&self, name: &str, rrn: &str) -> StorageResult<Option<Member>> {
        Ok(self
            .find_all()?
            .into_iter()
            .find(|member| member.name == name && member.rrn == rrn))
    }

    pub fn exists_by_email_and_name_and_rrn(
        &self,
        email: &str,
        name: &str,
        rrn: &str,
    ) -> StorageResult<bool> {
        Ok(self
            .find_by_email(email)?
            .is_some_and(|member| member.name == name && member.rrn == rrn))
    }

    /// Insert a new member; fails with `AlreadyExists` if the email is taken.
    pub fn insert(&self, member: &Member) -> StorageResult<()> {
        let json = serde_json::to_vec(member)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MEMBERS)?;
            if table.get(member.email.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(member.email.clone()));
            }
            table.insert(member.email.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Replace the member stored under `current_email` with `member`.
    ///
    /// A changed `member.email` re-keys the record in the same transaction; the
    /// new email must not belong to anyone else.
    pub fn update(&self, current_email: &str, member: &Member) -> StorageResult<()> {
        let json = serde_json::to_vec(member)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MEMBERS)?;
            if table.get(current_email)?.is_none() {
                return Err(StorageError::not_found(MEMBER, current_email));
            }
            if member.email != current_email {
                if table.get(member.email.as_str())?.is_some() {
                    return Err(StorageError::AlreadyExists(member.email.clone()));
                }
                table.remove(current_email)?;
            }
            table.insert(member.email.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn delete(&self, email: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MEMBERS)?;
            if table.remove(email)?.is_none() {
                return Err(StorageError::not_found(MEMBER, email));
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// All members ordered by email.
    pub fn find_all(&self) -> StorageResult<Vec<Member>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MEMBERS)?;

        let mut members = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            members.push(serde_json::from_slice(value.value())?);
        }
        Ok(members)
    }

    pub fn count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MEMBERS)?;
        Ok(table.len()?)
    }

    /// Store arbitrary bytes under `email`, bypassing serialization.
    #[cfg(test)]
    pub(crate) fn insert_raw(&self, email: &str, bytes: &[u8]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MEMBERS)?;
            table.insert(email, bytes)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[async_trait]
impl MemberDetailsService for MemberRepository {
    async fn load_by_subject(&self, subject: &str) -> Option<Principal> {
        match self.find_by_email(subject) {
            Ok(member) => member.map(|member| member.to_principal()),
            Err(e) => {
                tracing::warn!(error = %e, "Member lookup failed, treating subject as unknown");
                None
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
