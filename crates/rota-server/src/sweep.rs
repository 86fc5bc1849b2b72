use std::sync::Arc;
use std::time::Duration;

use rota_core::db::RotaDb;
use rota_core::reconcile::reconcile_all;

/// Run a reconcile pass every `interval`, forever.
///
/// Each pass runs on the blocking pool. A failed pass is logged and the loop
/// carries on; the next tick retries whatever is still unassigned.
pub async fn run(db: Arc<RotaDb>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; skip it so startup stays quiet.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let db = db.clone();
        match tokio::task::spawn_blocking(move || reconcile_all(db.as_ref())).await {
            Ok(Ok(report)) if report.assigned > 0 || report.halted => {
                tracing::info!(summary = %report.summary(), "scheduled reconcile");
            }
            Ok(Ok(_)) => tracing::debug!("scheduled reconcile: nothing to do"),
            Ok(Err(e)) => tracing::warn!(error = %e, "scheduled reconcile failed"),
            Err(e) => tracing::error!(error = %e, "scheduled reconcile panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::item::{ItemFilter, NewItem};
    use rota_core::worker::Worker;
    use tempfile::TempDir;

    #[tokio::test]
    async fn sweep_assigns_backlog() {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(RotaDb::open(&dir.path().join("t.db")).unwrap());
        db.create_item(NewItem::default()).unwrap();
        db.create_item(NewItem::default()).unwrap();
        db.add_worker(&Worker::new("W1")).unwrap();

        let handle = tokio::spawn(run(db.clone(), Duration::from_millis(20)));
        for _ in 0..100 {
            if db.list_items(ItemFilter::Unassigned).unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert!(db.list_items(ItemFilter::Unassigned).unwrap().is_empty());
    }
}
