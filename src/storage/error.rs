// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error type shared by the redb repositories.

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid value: {0}")]
    Invalid(String),
}

impl StorageError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        StorageError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
