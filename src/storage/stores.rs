// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Store directory backed by redb.
//!
//! ## Table Layout
//!
//! - `stores`: store id → serialized [`Store`] (JSON bytes); ids are assigned
//!   in insertion order starting at 1
//! - `scores`: store id → serialized [`ScoreTally`] (JSON bytes)
//!
//! Scores are kept as a running sum and count, so every read returns the
//! average without scanning individual ratings.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use super::error::{StorageError, StorageResult};

const STORES: TableDefinition<u64, &[u8]> = TableDefinition::new("stores");
const SCORES: TableDefinition<u64, &[u8]> = TableDefinition::new("scores");

const STORE: &str = "Store";

/// Lowest accepted rating.
pub const MIN_SCORE: u8 = 1;
/// Highest accepted rating.
pub const MAX_SCORE: u8 = 5;

/// Descriptive fields of a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDetails {
    pub name: String,
    pub address: String,
    /// Phone number
    pub tell: String,
    pub operating_time: String,
    /// Category, e.g. "cafe"
    pub store_type: String,
    pub representative_menu: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: u64,
    pub details: StoreDetails,
}

/// Running total of the ratings given to one store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTally {
    pub total: u64,
    pub count: u64,
}

impl ScoreTally {
    /// Mean rating, `None` while unrated.
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total as f64 / self.count as f64)
    }
}

/// A store together with its average rating.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedStore {
    pub store: Store,
    pub score: Option<f64>,
}

pub struct StoreRepository {
    db: Database,
}

impl StoreRepository {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(STORES)?;
            let _ = write_txn.open_table(SCORES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Add a store under the next free id.
    pub fn insert(&self, details: StoreDetails) -> StorageResult<Store> {
        let write_txn = self.db.begin_write()?;
        let store = {
            let mut table = write_txn.open_table(STORES)?;
            let id = match table.last()? {
                Some((key, _)) => key.value() + 1,
                None => 1,
            };
            let store = Store { id, details };
            let json = serde_json::to_vec(&store)?;
            table.insert(id, json.as_slice())?;
            store
        };
        write_txn.commit()?;
        Ok(store)
    }

    pub fn find_by_id(&self, id: u64) -> StorageResult<Option<RatedStore>> {
        let read_txn = self.db.begin_read()?;
        let stores = read_txn.open_table(STORES)?;
        let scores = read_txn.open_table(SCORES)?;

        let store: Store = match stores.get(id)? {
            Some(value) => serde_json::from_slice(value.value())?,
            None => return Ok(None),
        };
        let tally = read_tally(&scores, id)?;
        Ok(Some(RatedStore {
            store,
            score: tally.average(),
        }))
    }

    /// All stores ordered by id.
    pub fn list(&self) -> StorageResult<Vec<RatedStore>> {
        self.list_where(|_| true)
    }

    /// Stores whose address contains `fragment`.
    pub fn list_by_address(&self, fragment: &str) -> StorageResult<Vec<RatedStore>> {
        self.list_where(|store| store.details.address.contains(fragment))
    }

    fn list_where(&self, keep: impl Fn(&Store) -> bool) -> StorageResult<Vec<RatedStore>> {
        let read_txn = self.db.begin_read()?;
        let stores = read_txn.open_table(STORES)?;
        let scores = read_txn.open_table(SCORES)?;

        let mut rated = Vec::new();
        for entry in stores.iter()? {
            let (_, value) = entry?;
            let store: Store = serde_json::from_slice(value.value())?;
            if !keep(&store) {
                continue;
            }
            let tally = read_tally(&scores, store.id)?;
            rated.push(RatedStore {
                store,
                score: tally.average(),
            });
        }
        Ok(rated)
    }

    /// Record one rating for store `id` and return the updated tally.
    pub fn add_score(&self, id: u64, score: u8) -> StorageResult<ScoreTally> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(StorageError::Invalid(format!(
                "score must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }

        let write_txn = self.db.begin_write()?;
        let tally = {
            let stores = write_txn.open_table(STORES)?;
            if stores.get(id)?.is_none() {
                return Err(StorageError::not_found(STORE, id));
            }

            let mut scores = write_txn.open_table(SCORES)?;
            let mut tally = read_tally(&scores, id)?;
            tally.total += u64::from(score);
            tally.count += 1;
            let json = serde_json::to_vec(&tally)?;
            scores.insert(id, json.as_slice())?;
            tally
        };
        write_txn.commit()?;
        Ok(tally)
    }
}

fn read_tally(scores: &impl ReadableTable<u64, &'static [u8]>, id: u64) -> StorageResult<ScoreTally> {
    match scores.get(id)? {
        Some(value) => Ok(serde_json::from_slice(value.value())?),
        None => Ok(ScoreTally::default()),
    }
}
