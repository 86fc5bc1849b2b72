use crate::cmd::open_project;
use crate::output::print_json;
use anyhow::Context;
use rota_core::reconcile::reconcile_all;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, db) = open_project(root)?;
    let report = reconcile_all(&db).context("reconcile failed")?;

    if json {
        print_json(&report)?;
    } else {
        println!("{}", report.summary());
        for f in &report.failures {
            println!("  item #{}: {}", f.item_id, f.error);
        }
    }

    if report.halted {
        anyhow::bail!("reconcile halted early; re-run once the store is available");
    }
    Ok(())
}
