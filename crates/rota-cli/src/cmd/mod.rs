pub mod config;
pub mod init;
pub mod item;
pub mod reconcile;
pub mod serve;
pub mod status;
pub mod worker;

use anyhow::Context;
use rota_core::config::Config;
use rota_core::db::RotaDb;
use std::path::Path;

/// Load the config and open the database it points at.
pub(crate) fn open_project(root: &Path) -> anyhow::Result<(Config, RotaDb)> {
    let config = Config::load(root).context("failed to load config")?;
    let db = config
        .open_db(root)
        .with_context(|| format!("failed to open {}", config.db_path(root).display()))?;
    Ok((config, db))
}
