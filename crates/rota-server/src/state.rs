use rota_core::config::Config;
use rota_core::db::RotaDb;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub db: Arc<RotaDb>,
}

impl AppState {
    /// Load `.rota/config.yaml` under `root` and open the configured database.
    pub fn load(root: PathBuf) -> anyhow::Result<Self> {
        let config = Config::load(&root)?;
        let db = config.open_db(&root)?;
        Ok(Self::new(root, config, db))
    }

    pub fn new(root: PathBuf, config: Config, db: RotaDb) -> Self {
        Self {
            root,
            config: Arc::new(config),
            db: Arc::new(db),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_requires_init() {
        let dir = TempDir::new().unwrap();
        assert!(AppState::load(dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn load_opens_configured_db() {
        let dir = TempDir::new().unwrap();
        Config::new("t").save(dir.path()).unwrap();
        let state = AppState::load(dir.path().to_path_buf()).unwrap();
        assert_eq!(state.config.project.name, "t");
        assert!(dir.path().join(".rota/rota.db").exists());
    }
}
