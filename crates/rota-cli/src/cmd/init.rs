use crate::output::print_json;
use anyhow::Context;
use rota_core::{config::Config, db::RotaDb, io, paths};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let project_name = name.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    });

    let dir = paths::rota_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let created_config = if !config_path.exists() {
        Config::new(&project_name)
            .save(root)
            .context("failed to write config.yaml")?;
        true
    } else {
        false
    };

    let config = Config::load(root).context("failed to load config")?;
    let db_path = config.db_path(root);
    let created_db = !db_path.exists();
    RotaDb::open(&db_path).with_context(|| format!("failed to create {}", db_path.display()))?;

    if json {
        print_json(&serde_json::json!({
            "root": root,
            "project": config.project.name,
            "created_config": created_config,
            "created_db": created_db,
        }))?;
    } else {
        println!("Initializing rota in: {}", root.display());
        let status = |created: bool| if created { "created:" } else { "exists: " };
        println!("  {} {}", status(created_config), paths::CONFIG_FILE);
        println!("  {} {}", status(created_db), config.database.display());
    }
    Ok(())
}
