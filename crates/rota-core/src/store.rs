//! Store contracts the engine reads and writes through.
//!
//! The engine never touches a concrete backend. [`crate::db::RotaDb`] is the
//! on-disk implementation; tests substitute their own.

use crate::error::Result;
use crate::types::{ItemId, WorkerId};
use crate::worker::Worker;

/// Read side of the worker pool.
pub trait PoolStore {
    /// Eligible workers in rotation order (see [`crate::resolver::order_pool`]).
    fn list_eligible_workers(&self) -> Result<Vec<Worker>>;
}

/// The assignment ledger. Single source of truth for the rotation anchor.
pub trait LedgerStore {
    /// Assignee of the highest-id item that has one.
    fn find_last_assigned_worker_id(&self) -> Result<Option<WorkerId>>;

    /// Ids of all unassigned items, ascending.
    fn list_unassigned_item_ids(&self) -> Result<Vec<ItemId>>;

    /// Set `item_id`'s assignee to `worker_id` only if it is still unassigned.
    ///
    /// Returns `true` iff this call performed the write. Fails with
    /// `ItemNotFound` when the item does not exist.
    fn conditionally_assign(&self, item_id: ItemId, worker_id: WorkerId) -> Result<bool>;
}
