use crate::cmd::open_project;
use crate::output::{print_json, print_table, short_id};
use anyhow::Context;
use clap::Subcommand;
use rota_core::types::Eligibility;
use rota_core::worker::{Worker, WorkerUpdate};
use std::path::Path;

#[derive(Subcommand)]
pub enum WorkerSubcommand {
    /// Add a worker to the pool (active unless --inactive)
    Add {
        #[arg(required = true)]
        name: Vec<String>,
        #[arg(long)]
        email: Option<String>,
        /// Add the worker without putting it into the rotation
        #[arg(long)]
        inactive: bool,
    },
    /// List all workers, oldest first
    List,
    /// Show one worker (full id or unique prefix)
    Show { id: String },
    /// Change a worker's name or email; the rotation position is kept
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// New email (pass an empty string to clear it)
        #[arg(long)]
        email: Option<String>,
    },
    /// Put a worker (back) into the rotation, at the end of the cycle
    Activate { id: String },
    /// Take a worker out of the rotation
    Deactivate { id: String },
}

pub fn run(root: &Path, subcmd: WorkerSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        WorkerSubcommand::Add {
            name,
            email,
            inactive,
        } => add(root, &name.join(" "), email, inactive, json),
        WorkerSubcommand::List => list(root, json),
        WorkerSubcommand::Show { id } => show(root, &id, json),
        WorkerSubcommand::Edit { id, name, email } => {
            edit(root, &id, WorkerUpdate { name, email }, json)
        }
        WorkerSubcommand::Activate { id } => set_status(root, &id, Eligibility::Active, json),
        WorkerSubcommand::Deactivate { id } => set_status(root, &id, Eligibility::Inactive, json),
    }
}

fn add(
    root: &Path,
    name: &str,
    email: Option<String>,
    inactive: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (_, db) = open_project(root)?;
    let mut worker = Worker::new(name);
    worker.email = email;
    if inactive {
        worker.status = Eligibility::Inactive;
    }
    db.add_worker(&worker).context("failed to save worker")?;

    if json {
        print_json(&worker)?;
    } else {
        println!("Added worker {} [{}] ({})", worker.name, worker.id, worker.status);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, db) = open_project(root)?;
    let workers = db.list_workers()?;

    if json {
        return print_json(&workers);
    }
    if workers.is_empty() {
        println!("No workers. Add one with: rota worker add <name>");
        return Ok(());
    }

    let rows = workers
        .iter()
        .map(|w| {
            vec![
                short_id(&w.id),
                w.name.clone(),
                w.email.clone().unwrap_or_default(),
                w.status.to_string(),
                w.eligible_since.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "EMAIL", "STATUS", "IN ROTATION SINCE"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let (_, db) = open_project(root)?;
    let worker = db.get_worker(db.resolve_worker_id(id)?)?;

    if json {
        return print_json(&worker);
    }
    println!("Worker: {}", worker.id);
    println!("Name:           {}", worker.name);
    if let Some(email) = &worker.email {
        println!("Email:          {email}");
    }
    println!("Status:         {}", worker.status);
    println!("Created:        {}", worker.created_at.format("%Y-%m-%d %H:%M"));
    println!("Eligible since: {}", worker.eligible_since.format("%Y-%m-%d %H:%M"));
    Ok(())
}

fn edit(root: &Path, id: &str, update: WorkerUpdate, json: bool) -> anyhow::Result<()> {
    if update.name.is_none() && update.email.is_none() {
        anyhow::bail!("nothing to change: pass --name and/or --email");
    }
    let (_, db) = open_project(root)?;
    let worker = db
        .update_worker(db.resolve_worker_id(id)?, update)
        .with_context(|| format!("failed to edit worker '{id}'"))?;

    if json {
        print_json(&worker)?;
    } else {
        println!("Updated worker {} [{}]", worker.name, worker.id);
    }
    Ok(())
}

fn set_status(root: &Path, id: &str, status: Eligibility, json: bool) -> anyhow::Result<()> {
    let (_, db) = open_project(root)?;
    let worker = db
        .set_eligibility(db.resolve_worker_id(id)?, status)
        .with_context(|| format!("failed to set worker '{id}' {status}"))?;

    if json {
        print_json(&worker)?;
    } else {
        println!("Worker {} [{}] is now {}", worker.name, worker.id, worker.status);
    }
    Ok(())
}
