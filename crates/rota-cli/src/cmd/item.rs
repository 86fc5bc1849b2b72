use crate::cmd::open_project;
use crate::output::{print_json, print_table, short_id};
use anyhow::{bail, Context};
use clap::Subcommand;
use rota_core::assigner;
use rota_core::item::{ItemFilter, NewItem};
use rota_core::types::AssignOutcome;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

#[derive(Subcommand)]
pub enum ItemSubcommand {
    /// Record a new item and assign it to the next worker in the rotation
    Create {
        /// Submitter name
        #[arg(long)]
        name: Option<String>,
        /// Submitter email
        #[arg(long)]
        email: Option<String>,
        /// Answer field as key=value (repeatable)
        #[arg(long = "answer", value_name = "KEY=VALUE")]
        answers: Vec<String>,
    },
    /// List items
    List {
        /// Only assigned items, newest first
        #[arg(long, conflicts_with = "unassigned")]
        assigned: bool,
        /// Only unassigned items
        #[arg(long)]
        unassigned: bool,
    },
    /// Show one item
    Show { id: u64 },
    /// Run the single-item assigner for an existing item
    Assign { id: u64 },
}

pub fn run(root: &Path, subcmd: ItemSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ItemSubcommand::Create {
            name,
            email,
            answers,
        } => create(root, name, email, &answers, json),
        ItemSubcommand::List {
            assigned,
            unassigned,
        } => {
            let filter = match (assigned, unassigned) {
                (true, _) => ItemFilter::Assigned,
                (_, true) => ItemFilter::Unassigned,
                _ => ItemFilter::All,
            };
            list(root, filter, json)
        }
        ItemSubcommand::Show { id } => show(root, id, json),
        ItemSubcommand::Assign { id } => assign(root, id, json),
    }
}

fn parse_answers(raw: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    let mut answers = BTreeMap::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid --answer '{pair}': expected KEY=VALUE");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("invalid --answer '{pair}': empty key");
        }
        answers.insert(key.to_string(), value.to_string());
    }
    Ok(answers)
}

fn describe(outcome: &AssignOutcome) -> String {
    match outcome {
        AssignOutcome::Assigned { worker_id } => format!("assigned to {worker_id}"),
        AssignOutcome::Skipped => "left unassigned (no eligible workers)".to_string(),
        AssignOutcome::AlreadyAssigned => "already assigned".to_string(),
    }
}

fn create(
    root: &Path,
    name: Option<String>,
    email: Option<String>,
    answers: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let new = NewItem {
        submitter_name: name,
        submitter_email: email,
        answers: parse_answers(answers)?,
    };
    let (config, db) = open_project(root)?;

    let (item, outcome) = if config.assignment.assign_on_create {
        let (item, outcome) = assigner::submit(&db, new).context("failed to create item")?;
        (item, Some(outcome))
    } else {
        (db.create_item(new).context("failed to create item")?, None)
    };

    if json {
        print_json(&serde_json::json!({ "item": item, "assignment": outcome }))?;
    } else {
        match &outcome {
            Some(o) => println!("Created item #{}: {}", item.id, describe(o)),
            None => println!("Created item #{} (unassigned)", item.id),
        }
    }
    Ok(())
}

fn list(root: &Path, filter: ItemFilter, json: bool) -> anyhow::Result<()> {
    let (_, db) = open_project(root)?;
    let mut items = db.list_items(filter)?;
    if filter == ItemFilter::Assigned {
        items.reverse();
    }

    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("No items.");
        return Ok(());
    }

    let names: HashMap<_, _> = db
        .list_workers()?
        .into_iter()
        .map(|w| (w.id, w.name))
        .collect();
    let rows = items
        .iter()
        .map(|i| {
            let assignee = match i.assignee {
                Some(id) => names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| short_id(&id)),
                None => "-".to_string(),
            };
            vec![
                i.id.to_string(),
                i.created_at.format("%Y-%m-%d %H:%M").to_string(),
                i.submitter_name.clone().unwrap_or_default(),
                assignee,
            ]
        })
        .collect();
    print_table(&["ID", "CREATED", "SUBMITTER", "ASSIGNEE"], rows);
    Ok(())
}

fn show(root: &Path, id: u64, json: bool) -> anyhow::Result<()> {
    let (_, db) = open_project(root)?;
    let item = db.get_item(id)?;

    if json {
        return print_json(&item);
    }
    println!("Item: #{}", item.id);
    println!("Created:   {}", item.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(name) = &item.submitter_name {
        println!("Submitter: {name}");
    }
    if let Some(email) = &item.submitter_email {
        println!("Email:     {email}");
    }
    match item.assignee {
        Some(w) => println!("Assignee:  {w}"),
        None => println!("Assignee:  (unassigned)"),
    }
    for (k, v) in &item.answers {
        println!("  {k}: {v}");
    }
    Ok(())
}

fn assign(root: &Path, id: u64, json: bool) -> anyhow::Result<()> {
    let (_, db) = open_project(root)?;
    let outcome = assigner::assign_one(&db, id).with_context(|| format!("failed to assign item #{id}"))?;

    if json {
        print_json(&outcome)?;
    } else {
        println!("Item #{id}: {}", describe(&outcome));
    }
    Ok(())
}
