//! Persistent pool and ledger storage using redb.
//!
//! # Table design
//!
//! ```text
//! workers : uuid bytes (16)        -> JSON Worker
//! items   : item id (u64)          -> JSON Item
//! meta    : "next_item_id"         -> u64
//! ```
//!
//! `items` is keyed by the sequence number, so key order is id order. The
//! rotation anchor is found by walking `items` backwards until the first
//! assigned entry, and unassigned items come out of a forward scan already
//! sorted.
//!
//! redb allows a single write transaction at a time. `conditionally_assign`
//! reads, checks and writes the item inside one write transaction, which is
//! what makes it a compare-and-set.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, RotaError};
use crate::item::{Item, ItemFilter, NewItem};
use crate::resolver::order_pool;
use crate::stats::Stats;
use crate::store::{LedgerStore, PoolStore};
use crate::types::{Eligibility, ItemId, WorkerId};
use crate::worker::{parse_worker_id, Worker, WorkerUpdate};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const WORKERS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("workers");
const ITEMS: TableDefinition<u64, &[u8]> = TableDefinition::new("items");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_ITEM_ID: &str = "next_item_id";

// ---------------------------------------------------------------------------
// Encoding helpers
// ---------------------------------------------------------------------------

fn store_err(e: impl std::fmt::Display) -> RotaError {
    RotaError::Store(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(store_err)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(store_err)
}

// ---------------------------------------------------------------------------
// RotaDb
// ---------------------------------------------------------------------------

/// On-disk pool and ledger.
pub struct RotaDb {
    db: Database,
}

impl RotaDb {
    /// Open or create the redb database at `path`.
    ///
    /// Creates all tables if they don't already exist.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(store_err)?;
        // Ensure the tables exist before any reads
        let wt = db.begin_write().map_err(store_err)?;
        wt.open_table(WORKERS).map_err(store_err)?;
        wt.open_table(ITEMS).map_err(store_err)?;
        wt.open_table(META).map_err(store_err)?;
        wt.commit().map_err(store_err)?;
        Ok(Self { db })
    }

    // -----------------------------------------------------------------------
    // Workers
    // -----------------------------------------------------------------------

    pub fn add_worker(&self, worker: &Worker) -> Result<()> {
        let value = encode(worker)?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(WORKERS).map_err(store_err)?;
            table
                .insert(worker.id.as_bytes().as_slice(), value.as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        tracing::info!(worker_id = %worker.id, name = %worker.name, status = %worker.status, "worker added");
        Ok(())
    }

    pub fn get_worker(&self, id: WorkerId) -> Result<Worker> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(WORKERS).map_err(store_err)?;
        let entry = table
            .get(id.as_bytes().as_slice())
            .map_err(store_err)?
            .ok_or_else(|| RotaError::WorkerNotFound(id.to_string()))?;
        decode(entry.value())
    }

    /// All workers, oldest first by creation time.
    pub fn list_workers(&self) -> Result<Vec<Worker>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(WORKERS).map_err(store_err)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, v) = entry.map_err(store_err)?;
            result.push(decode::<Worker>(v.value())?);
        }
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(result)
    }

    /// Resolve a full worker id or a unique prefix of one, as shown in
    /// `rota worker list`.
    pub fn resolve_worker_id(&self, raw: &str) -> Result<WorkerId> {
        let raw = raw.trim();
        if let Ok(id) = parse_worker_id(raw) {
            return Ok(id);
        }
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(RotaError::InvalidWorkerId(raw.to_string()));
        }
        let prefix = raw.to_ascii_lowercase();
        let mut matches = self
            .list_workers()?
            .into_iter()
            .filter(|w| w.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(w), None) => Ok(w.id),
            (Some(_), Some(_)) => Err(RotaError::AmbiguousWorkerId(raw.to_string())),
            (None, _) => Err(RotaError::WorkerNotFound(raw.to_string())),
        }
    }

    /// Edit a worker's name or email. Status and rotation position are kept.
    pub fn update_worker(&self, id: WorkerId, update: WorkerUpdate) -> Result<Worker> {
        let wt = self.db.begin_write().map_err(store_err)?;
        let worker = {
            let mut table = wt.open_table(WORKERS).map_err(store_err)?;
            let current = table
                .get(id.as_bytes().as_slice())
                .map_err(store_err)?
                .map(|v| v.value().to_vec());
            let Some(bytes) = current else {
                drop(table);
                wt.abort().map_err(store_err)?;
                return Err(RotaError::WorkerNotFound(id.to_string()));
            };
            let mut worker: Worker = decode(&bytes)?;
            worker.apply(update)?;
            let value = encode(&worker)?;
            table
                .insert(id.as_bytes().as_slice(), value.as_slice())
                .map_err(store_err)?;
            worker
        };
        wt.commit().map_err(store_err)?;
        tracing::info!(worker_id = %id, name = %worker.name, "worker updated");
        Ok(worker)
    }

    /// Change a worker's status.
    ///
    /// Reactivation moves the worker to the back of the rotation: its
    /// `eligible_since` becomes later than that of every other eligible
    /// worker. The read of the current pool and the write happen in the same
    /// transaction.
    pub fn set_eligibility(&self, id: WorkerId, status: Eligibility) -> Result<Worker> {
        let now = Utc::now();
        let wt = self.db.begin_write().map_err(store_err)?;
        let worker = {
            let mut table = wt.open_table(WORKERS).map_err(store_err)?;
            let mut target: Option<Worker> = None;
            let mut latest = None;
            for entry in table.iter().map_err(store_err)? {
                let (_, v) = entry.map_err(store_err)?;
                let w: Worker = decode(v.value())?;
                if w.id == id {
                    target = Some(w);
                } else if w.is_eligible() {
                    latest = latest.max(Some(w.eligible_since));
                }
            }
            let Some(mut worker) = target else {
                drop(table);
                wt.abort().map_err(store_err)?;
                return Err(RotaError::WorkerNotFound(id.to_string()));
            };
            if worker.transition(status, now, latest) {
                let value = encode(&worker)?;
                table
                    .insert(id.as_bytes().as_slice(), value.as_slice())
                    .map_err(store_err)?;
                tracing::info!(
                    worker_id = %id,
                    status = %status,
                    eligible_since = %worker.eligible_since,
                    "worker status changed"
                );
            } else {
                tracing::debug!(worker_id = %id, status = %status, "worker status unchanged");
            }
            worker
        };
        wt.commit().map_err(store_err)?;
        Ok(worker)
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Append a new unassigned item with the next sequence number.
    pub fn create_item(&self, new: NewItem) -> Result<Item> {
        let wt = self.db.begin_write().map_err(store_err)?;
        let item = {
            let mut meta = wt.open_table(META).map_err(store_err)?;
            let id: ItemId = meta
                .get(NEXT_ITEM_ID)
                .map_err(store_err)?
                .map(|v| v.value())
                .unwrap_or(1);
            meta.insert(NEXT_ITEM_ID, id + 1).map_err(store_err)?;

            let item = new.into_item(id, Utc::now());
            let value = encode(&item)?;
            let mut items = wt.open_table(ITEMS).map_err(store_err)?;
            items.insert(id, value.as_slice()).map_err(store_err)?;
            item
        };
        wt.commit().map_err(store_err)?;
        tracing::debug!(item_id = item.id, "item created");
        Ok(item)
    }

    pub fn get_item(&self, id: ItemId) -> Result<Item> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(ITEMS).map_err(store_err)?;
        let entry = table
            .get(id)
            .map_err(store_err)?
            .ok_or(RotaError::ItemNotFound(id))?;
        decode(entry.value())
    }

    /// Items matching `filter`, ascending by id.
    pub fn list_items(&self, filter: ItemFilter) -> Result<Vec<Item>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(ITEMS).map_err(store_err)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, v) = entry.map_err(store_err)?;
            let item: Item = decode(v.value())?;
            if filter.matches(&item) {
                result.push(item);
            }
        }
        Ok(result)
    }

    pub fn stats(&self) -> Result<Stats> {
        let workers = self.list_workers()?;
        let items = self.list_items(ItemFilter::All)?;
        Ok(Stats::compute(&workers, &items))
    }
}

// ---------------------------------------------------------------------------
// Engine contracts
// ---------------------------------------------------------------------------

impl PoolStore for RotaDb {
    fn list_eligible_workers(&self) -> Result<Vec<Worker>> {
        Ok(order_pool(self.list_workers()?))
    }
}

impl LedgerStore for RotaDb {
    fn find_last_assigned_worker_id(&self) -> Result<Option<WorkerId>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(ITEMS).map_err(store_err)?;
        for entry in table.iter().map_err(store_err)?.rev() {
            let (_, v) = entry.map_err(store_err)?;
            let item: Item = decode(v.value())?;
            if item.assignee.is_some() {
                return Ok(item.assignee);
            }
        }
        Ok(None)
    }

    fn list_unassigned_item_ids(&self) -> Result<Vec<ItemId>> {
        Ok(self
            .list_items(ItemFilter::Unassigned)?
            .into_iter()
            .map(|item| item.id)
            .collect())
    }

    fn conditionally_assign(&self, item_id: ItemId, worker_id: WorkerId) -> Result<bool> {
        let wt = self.db.begin_write().map_err(store_err)?;
        let written = {
            let mut table = wt.open_table(ITEMS).map_err(store_err)?;
            let current = table
                .get(item_id)
                .map_err(store_err)?
                .map(|v| v.value().to_vec());
            match current {
                None => None,
                Some(bytes) => {
                    let mut item: Item = decode(&bytes)?;
                    if item.is_assigned() {
                        Some(false)
                    } else {
                        item.assignee = Some(worker_id);
                        let value = encode(&item)?;
                        table.insert(item_id, value.as_slice()).map_err(store_err)?;
                        Some(true)
                    }
                }
            }
        };
        match written {
            Some(true) => {
                wt.commit().map_err(store_err)?;
                Ok(true)
            }
            Some(false) => {
                wt.abort().map_err(store_err)?;
                Ok(false)
            }
            None => {
                wt.abort().map_err(store_err)?;
                Err(RotaError::ItemNotFound(item_id))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
