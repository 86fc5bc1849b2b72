//! Rotation rule.
//!
//! Eligible workers form a cycle ordered by seniority (`eligible_since`
//! ascending, ties by id). The next recipient is the worker after the one
//! that received the most recent assignment. If that worker is no longer in
//! the pool, rotation restarts at the head instead of guessing a position.

use crate::error::{Result, RotaError};
use crate::types::WorkerId;
use crate::worker::Worker;

/// Filter `workers` to the eligible ones and sort them into rotation order.
pub fn order_pool(workers: impl IntoIterator<Item = Worker>) -> Vec<Worker> {
    let mut pool: Vec<Worker> = workers.into_iter().filter(Worker::is_eligible).collect();
    pool.sort_by(|a, b| {
        a.eligible_since
            .cmp(&b.eligible_since)
            .then_with(|| a.id.cmp(&b.id))
    });
    pool
}

/// Pick the worker that receives the next item.
///
/// `pool` must already be in rotation order (see [`order_pool`]).
pub fn resolve_next(pool: &[Worker], last_assigned: Option<WorkerId>) -> Result<WorkerId> {
    let head = pool.first().ok_or(RotaError::EmptyPool)?;
    let Some(anchor) = last_assigned else {
        return Ok(head.id);
    };
    match pool.iter().position(|w| w.id == anchor) {
        Some(i) => Ok(pool[(i + 1) % pool.len()].id),
        None => Ok(head.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Eligibility;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    /// `n` eligible workers, oldest first.
    fn pool_of(n: usize) -> Vec<Worker> {
        let base = Utc::now();
        let workers = (0..n).map(|i| {
            let mut w = Worker::new(format!("W{}", i + 1));
            w.eligible_since = base + Duration::seconds(i as i64);
            w
        });
        order_pool(workers)
    }

    #[test]
    fn empty_pool_fails() {
        let err = resolve_next(&[], None).unwrap_err();
        assert!(matches!(err, RotaError::EmptyPool));
        let err = resolve_next(&[], Some(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, RotaError::EmptyPool));
    }

    #[test]
    fn no_anchor_returns_most_senior() {
        let pool = pool_of(3);
        assert_eq!(resolve_next(&pool, None).unwrap(), pool[0].id);
    }

    #[test]
    fn anchor_advances_and_wraps() {
        for n in 1..=5 {
            let pool = pool_of(n);
            for (i, w) in pool.iter().enumerate() {
                let next = resolve_next(&pool, Some(w.id)).unwrap();
                assert_eq!(next, pool[(i + 1) % n].id, "pool size {n}, anchor {i}");
            }
        }
    }

    #[test]
    fn unknown_anchor_resets_to_head() {
        let pool = pool_of(3);
        let gone = Uuid::new_v4();
        assert_eq!(resolve_next(&pool, Some(gone)).unwrap(), pool[0].id);
    }

    #[test]
    fn order_pool_drops_ineligible_and_sorts_by_seniority() {
        let base = Utc::now();
        let mut young = Worker::new("young");
        young.eligible_since = base + Duration::seconds(10);
        let mut old = Worker::new("old");
        old.eligible_since = base;
        let mut off = Worker::new("off");
        off.status = Eligibility::Inactive;
        off.eligible_since = base - Duration::seconds(10);

        let pool = order_pool(vec![young.clone(), off, old.clone()]);
        let names: Vec<&str> = pool.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["old", "young"]);
    }

    #[test]
    fn seniority_ties_break_by_id() {
        let at = Utc::now();
        let mut a = Worker::new("a");
        let mut b = Worker::new("b");
        a.eligible_since = at;
        b.eligible_since = at;
        let pool = order_pool(vec![a.clone(), b.clone()]);
        let expected_first = if a.id < b.id { a.id } else { b.id };
        assert_eq!(pool[0].id, expected_first);
    }

    #[test]
    fn deactivated_anchor_mid_cycle_is_skipped() {
        // W1 got item1; W2 goes inactive before item2 resolves.
        let mut workers = pool_of(3);
        let (w1, w3) = (workers[0].id, workers[2].id);
        workers[1].status = Eligibility::Inactive;
        let pool = order_pool(workers);
        assert_eq!(resolve_next(&pool, Some(w1)).unwrap(), w3);
    }
}
