//! Single-item assignment: the fast path fired when an item is created.

use crate::db::RotaDb;
use crate::error::{Result, RotaError};
use crate::item::{Item, NewItem};
use crate::resolver::resolve_next;
use crate::store::{LedgerStore, PoolStore};
use crate::types::{AssignOutcome, ItemId};

/// Assign `item_id` to the next worker in the rotation.
///
/// An empty pool yields `Skipped` and leaves the item for a later
/// reconcile pass. Losing the compare-and-set to a concurrent caller yields
/// `AlreadyAssigned`; either way the item ends up assigned at most once.
pub fn assign_one<S>(store: &S, item_id: ItemId) -> Result<AssignOutcome>
where
    S: PoolStore + LedgerStore + ?Sized,
{
    let pool = store.list_eligible_workers()?;
    let anchor = store.find_last_assigned_worker_id()?;

    let worker_id = match resolve_next(&pool, anchor) {
        Ok(id) => id,
        Err(RotaError::EmptyPool) => {
            tracing::debug!(item_id, "no eligible workers, item left unassigned");
            return Ok(AssignOutcome::Skipped);
        }
        Err(e) => return Err(e),
    };

    if store.conditionally_assign(item_id, worker_id)? {
        tracing::info!(item_id, worker_id = %worker_id, "item assigned");
        Ok(AssignOutcome::Assigned { worker_id })
    } else {
        tracing::debug!(item_id, "item already assigned by another caller");
        Ok(AssignOutcome::AlreadyAssigned)
    }
}

/// Record a new item and fire the item-created trigger for it.
pub fn submit(db: &RotaDb, new: NewItem) -> Result<(Item, AssignOutcome)> {
    let item = db.create_item(new)?;
    let outcome = assign_one(db, item.id)?;
    let item = match outcome {
        AssignOutcome::Assigned { worker_id } => Item {
            assignee: Some(worker_id),
            ..item
        },
        _ => db.get_item(item.id)?,
    };
    Ok((item, outcome))
}
