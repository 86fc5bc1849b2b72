use crate::cmd::open_project;
use crate::output::{print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, db) = open_project(root)?;
    let stats = db.stats()?;

    if json {
        return print_json(&serde_json::json!({
            "project": config.project.name,
            "stats": stats,
        }));
    }

    println!("Project: {}", config.project.name);
    println!(
        "Workers: {} active / {} total",
        stats.active_workers, stats.total_workers
    );
    println!(
        "Items:   {} assigned, {} unassigned",
        stats.assigned_items, stats.unassigned_items
    );
    if stats.unassigned_items > 0 {
        println!("         run `rota reconcile` to assign the backlog");
    }

    if !stats.per_worker.is_empty() {
        println!();
        let rows = stats
            .per_worker
            .iter()
            .map(|t| vec![t.name.clone(), t.status.to_string(), t.assigned.to_string()])
            .collect();
        print_table(&["WORKER", "STATUS", "ASSIGNED"], rows);
    }
    Ok(())
}
