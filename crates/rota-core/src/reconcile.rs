//! Batch reconciliation: assign every item that is still unassigned.
//!
//! The pool and the rotation anchor are read once. The anchor is then
//! advanced in memory after each successful write, so a batch walks one
//! unbroken cycle even though items are committed one at a time.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RotaError};
use crate::resolver::resolve_next;
use crate::store::{LedgerStore, PoolStore};
use crate::types::ItemId;

/// A per-item failure recorded during a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub item_id: ItemId,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Items this pass assigned.
    pub assigned: usize,
    /// Items a concurrent caller assigned while the pass was running.
    pub already_assigned: usize,
    /// Items still unassigned when the pass finished.
    pub left_unassigned: usize,
    /// Size of the eligible pool snapshot.
    pub pool_size: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ItemFailure>,
    /// The store failed mid-batch and the remaining items were not attempted.
    #[serde(default)]
    pub halted: bool,
}

impl ReconcileReport {
    /// Operator-facing one-liner.
    pub fn summary(&self) -> String {
        let mut out = format!("{} items assigned", self.assigned);
        if self.left_unassigned > 0 {
            if self.pool_size == 0 {
                out.push_str(&format!(
                    ", {} left unassigned (no eligible workers)",
                    self.left_unassigned
                ));
            } else {
                out.push_str(&format!(", {} left unassigned", self.left_unassigned));
            }
        }
        if self.already_assigned > 0 {
            out.push_str(&format!(
                ", {} already assigned concurrently",
                self.already_assigned
            ));
        }
        if !self.failures.is_empty() {
            out.push_str(&format!(", {} failed", self.failures.len()));
        }
        if self.halted {
            out.push_str(" (halted: store unavailable)");
        }
        out
    }
}

/// Drain all unassigned items through the rotation.
///
/// Running this twice with nothing new in between assigns nothing the second
/// time. A store failure stops the batch but keeps every write that already
/// committed; re-running picks up where it left off.
pub fn reconcile_all<S>(store: &S) -> Result<ReconcileReport>
where
    S: PoolStore + LedgerStore + ?Sized,
{
    let pool = store.list_eligible_workers()?;
    let mut anchor = store.find_last_assigned_worker_id()?;
    let pending = store.list_unassigned_item_ids()?;

    let mut report = ReconcileReport {
        pool_size: pool.len(),
        ..Default::default()
    };

    if pool.is_empty() {
        report.left_unassigned = pending.len();
        tracing::info!(
            unassigned = pending.len(),
            "reconcile skipped: no eligible workers"
        );
        return Ok(report);
    }

    for (idx, &item_id) in pending.iter().enumerate() {
        let worker_id = resolve_next(&pool, anchor)?;
        match store.conditionally_assign(item_id, worker_id) {
            Ok(true) => {
                tracing::debug!(item_id, worker_id = %worker_id, "item assigned");
                anchor = Some(worker_id);
                report.assigned += 1;
            }
            Ok(false) => {
                tracing::debug!(item_id, "item already assigned by another caller");
                report.already_assigned += 1;
            }
            Err(e @ RotaError::Store(_)) => {
                tracing::warn!(item_id, error = %e, "store failed, halting reconcile");
                report.failures.push(ItemFailure {
                    item_id,
                    error: e.to_string(),
                });
                report.halted = true;
                // The failed item and everything after it stay unassigned.
                report.left_unassigned += pending.len() - idx;
                break;
            }
            Err(e) => {
                tracing::warn!(item_id, error = %e, "item failed, continuing");
                report.failures.push(ItemFailure {
                    item_id,
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        assigned = report.assigned,
        already_assigned = report.already_assigned,
        failed = report.failures.len(),
        halted = report.halted,
        "reconcile finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RotaDb;
    use crate::item::{ItemFilter, NewItem};
    use crate::types::{Eligibility, WorkerId};
    use crate::worker::Worker;
    use chrono::{Duration, Utc};
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, BTreeSet};
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, RotaDb) {
        let dir = TempDir::new().unwrap();
        let db = RotaDb::open(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn add_workers(db: &RotaDb, n: usize) -> Vec<WorkerId> {
        let base = Utc::now() - Duration::minutes(10);
        (0..n)
            .map(|i| {
                let mut w = Worker::new(format!("W{}", i + 1));
                w.created_at = base + Duration::seconds(i as i64);
                w.eligible_since = w.created_at;
                db.add_worker(&w).unwrap();
                w.id
            })
            .collect()
    }

    fn create_items(db: &RotaDb, n: usize) {
        for _ in 0..n {
            db.create_item(NewItem::default()).unwrap();
        }
    }

    fn assignees(db: &RotaDb) -> Vec<Option<WorkerId>> {
        db.list_items(ItemFilter::All)
            .unwrap()
            .into_iter()
            .map(|i| i.assignee)
            .collect()
    }

    #[test]
    fn full_cycle_is_fair() {
        let (_dir, db) = open_tmp();
        let w = add_workers(&db, 3);
        create_items(&db, 3);

        let report = reconcile_all(&db).unwrap();
        assert_eq!(report.assigned, 3);
        assert_eq!(report.left_unassigned, 0);
        assert_eq!(assignees(&db), vec![Some(w[0]), Some(w[1]), Some(w[2])]);
    }

    #[test]
    fn batch_continues_from_existing_anchor() {
        let (_dir, db) = open_tmp();
        let w = add_workers(&db, 3);
        create_items(&db, 1);
        db.conditionally_assign(1, w[1]).unwrap();
        create_items(&db, 4);

        reconcile_all(&db).unwrap();
        assert_eq!(
            assignees(&db),
            vec![Some(w[1]), Some(w[2]), Some(w[0]), Some(w[1]), Some(w[2])]
        );
    }

    #[test]
    fn second_run_is_a_noop() {
        let (_dir, db) = open_tmp();
        add_workers(&db, 2);
        create_items(&db, 5);

        let first = reconcile_all(&db).unwrap();
        assert_eq!(first.assigned, 5);
        let before = assignees(&db);

        let second = reconcile_all(&db).unwrap();
        assert_eq!(second.assigned, 0);
        assert_eq!(assignees(&db), before);
    }

    #[test]
    fn empty_pool_assigns_nothing() {
        let (_dir, db) = open_tmp();
        create_items(&db, 3);

        let report = reconcile_all(&db).unwrap();
        assert_eq!(report.assigned, 0);
        assert_eq!(report.left_unassigned, 3);
        assert_eq!(
            report.summary(),
            "0 items assigned, 3 left unassigned (no eligible workers)"
        );
        assert!(assignees(&db).iter().all(Option::is_none));
    }

    #[test]
    fn batch_and_single_path_agree() {
        let (_dir, batch) = open_tmp();
        let (_dir2, single) = open_tmp();
        // Same workers in both stores so ids line up.
        let base = Utc::now() - Duration::minutes(5);
        let workers: Vec<Worker> = (0..3)
            .map(|i| {
                let mut w = Worker::new(format!("W{i}"));
                w.created_at = base + Duration::seconds(i);
                w.eligible_since = w.created_at;
                w
            })
            .collect();
        for w in &workers {
            batch.add_worker(w).unwrap();
            single.add_worker(w).unwrap();
        }
        batch
            .set_eligibility(workers[0].id, Eligibility::Inactive)
            .unwrap();
        single
            .set_eligibility(workers[0].id, Eligibility::Inactive)
            .unwrap();

        create_items(&batch, 5);
        reconcile_all(&batch).unwrap();
        for _ in 0..5 {
            crate::assigner::submit(&single, NewItem::default()).unwrap();
        }
        assert_eq!(assignees(&batch), assignees(&single));
    }

    // -----------------------------------------------------------------------
    // Failure handling against a scripted store
    // -----------------------------------------------------------------------

    struct Scripted {
        pool: Vec<Worker>,
        pending: Vec<ItemId>,
        /// item id -> error to return when that item is written
        fail: BTreeMap<ItemId, fn(ItemId) -> RotaError>,
        /// items another caller assigns first
        lost: BTreeSet<ItemId>,
        writes: RefCell<Vec<(ItemId, WorkerId)>>,
        reads: Cell<usize>,
    }

    impl Scripted {
        fn new(workers: usize, items: usize) -> Self {
            let base = Utc::now();
            let pool: Vec<Worker> = (0..workers)
                .map(|i| {
                    let mut w = Worker::new(format!("W{i}"));
                    w.eligible_since = base + Duration::seconds(i as i64);
                    w
                })
                .collect();
            Self {
                pool: crate::resolver::order_pool(pool),
                pending: (1..=items as u64).collect(),
                fail: BTreeMap::new(),
                lost: BTreeSet::new(),
                writes: RefCell::new(Vec::new()),
                reads: Cell::new(0),
            }
        }
    }

    impl PoolStore for Scripted {
        fn list_eligible_workers(&self) -> Result<Vec<Worker>> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.pool.clone())
        }
    }

    impl LedgerStore for Scripted {
        fn find_last_assigned_worker_id(&self) -> Result<Option<WorkerId>> {
            self.reads.set(self.reads.get() + 1);
            Ok(None)
        }

        fn list_unassigned_item_ids(&self) -> Result<Vec<ItemId>> {
            Ok(self.pending.clone())
        }

        fn conditionally_assign(&self, item_id: ItemId, worker_id: WorkerId) -> Result<bool> {
            if let Some(make) = self.fail.get(&item_id) {
                return Err(make(item_id));
            }
            if self.lost.contains(&item_id) {
                return Ok(false);
            }
            self.writes.borrow_mut().push((item_id, worker_id));
            Ok(true)
        }
    }

    #[test]
    fn snapshot_is_read_once() {
        let store = Scripted::new(3, 6);
        reconcile_all(&store).unwrap();
        assert_eq!(store.reads.get(), 2);
        let ws: Vec<WorkerId> = store.writes.borrow().iter().map(|(_, w)| *w).collect();
        let p: Vec<WorkerId> = store.pool.iter().map(|w| w.id).collect();
        assert_eq!(ws, vec![p[0], p[1], p[2], p[0], p[1], p[2]]);
    }

    #[test]
    fn item_failure_does_not_stop_the_batch() {
        let mut store = Scripted::new(2, 4);
        store.fail.insert(2, RotaError::ItemNotFound);

        let report = reconcile_all(&store).unwrap();
        assert_eq!(report.assigned, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].item_id, 2);
        assert!(!report.halted);

        // The anchor only advances on success, so item 3 gets W2.
        let p: Vec<WorkerId> = store.pool.iter().map(|w| w.id).collect();
        assert_eq!(
            *store.writes.borrow(),
            vec![(1, p[0]), (3, p[1]), (4, p[0])]
        );
    }

    #[test]
    fn lost_race_counts_as_already_assigned_and_keeps_anchor() {
        let mut store = Scripted::new(3, 4);
        store.lost.insert(2);

        let report = reconcile_all(&store).unwrap();
        assert_eq!(report.assigned, 3);
        assert_eq!(report.already_assigned, 1);
        assert!(report.failures.is_empty());
        assert!(!report.halted);

        // Item 2 would have gone to W2; item 3 takes that turn instead.
        let p: Vec<WorkerId> = store.pool.iter().map(|w| w.id).collect();
        assert_eq!(
            *store.writes.borrow(),
            vec![(1, p[0]), (3, p[1]), (4, p[2])]
        );
        assert!(report.summary().contains("1 already assigned concurrently"));
    }

    #[test]
    fn store_failure_halts_but_keeps_prior_writes() {
        let mut store = Scripted::new(2, 5);
        store
            .fail
            .insert(3, |_| RotaError::Store("disk unplugged".into()));

        let report = reconcile_all(&store).unwrap();
        assert!(report.halted);
        assert_eq!(report.assigned, 2);
        assert_eq!(report.left_unassigned, 3);
        assert_eq!(store.writes.borrow().len(), 2);
        assert!(report.summary().contains("halted"));
    }
}
