use crate::item::Item;
use crate::types::{Eligibility, WorkerId};
use crate::worker::Worker;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-worker assignment total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerTally {
    pub worker_id: WorkerId,
    pub name: String,
    pub status: Eligibility,
    pub assigned: usize,
}

/// Pool and ledger counts for the status dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_workers: usize,
    pub active_workers: usize,
    pub total_items: usize,
    pub assigned_items: usize,
    pub unassigned_items: usize,
    /// One row per known worker, in creation order.
    pub per_worker: Vec<WorkerTally>,
}

impl Stats {
    pub fn compute(workers: &[Worker], items: &[Item]) -> Self {
        let mut counts: HashMap<WorkerId, usize> = HashMap::new();
        for id in items.iter().filter_map(|i| i.assignee) {
            *counts.entry(id).or_default() += 1;
        }
        let assigned_items: usize = counts.values().sum();

        let per_worker = workers
            .iter()
            .map(|w| WorkerTally {
                worker_id: w.id,
                name: w.name.clone(),
                status: w.status,
                assigned: counts.get(&w.id).copied().unwrap_or(0),
            })
            .collect();

        Self {
            total_workers: workers.len(),
            active_workers: workers.iter().filter(|w| w.is_eligible()).count(),
            total_items: items.len(),
            assigned_items,
            unassigned_items: items.len() - assigned_items,
            per_worker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NewItem;
    use chrono::Utc;

    #[test]
    fn counts_assignments_per_worker() {
        let a = Worker::new("a");
        let mut b = Worker::new("b");
        b.status = Eligibility::Inactive;

        let mut items: Vec<Item> = (1..=4)
            .map(|id| NewItem::default().into_item(id, Utc::now()))
            .collect();
        items[0].assignee = Some(a.id);
        items[1].assignee = Some(b.id);
        items[2].assignee = Some(a.id);

        let stats = Stats::compute(&[a.clone(), b.clone()], &items);
        assert_eq!(stats.total_workers, 2);
        assert_eq!(stats.active_workers, 1);
        assert_eq!(stats.assigned_items, 3);
        assert_eq!(stats.unassigned_items, 1);
        assert_eq!(stats.per_worker[0].assigned, 2);
        assert_eq!(stats.per_worker[1].assigned, 1);
    }
}
