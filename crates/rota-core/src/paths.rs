use std::path::{Path, PathBuf};

pub const ROTA_DIR: &str = ".rota";
pub const CONFIG_FILE: &str = ".rota/config.yaml";
pub const DEFAULT_DB_FILE: &str = ".rota/rota.db";

pub fn rota_dir(root: &Path) -> PathBuf {
    root.join(ROTA_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a database path from config: relative paths are taken from `root`.
pub fn db_path(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_db_path_is_under_root() {
        let root = Path::new("/srv/team");
        assert_eq!(
            db_path(root, Path::new(DEFAULT_DB_FILE)),
            PathBuf::from("/srv/team/.rota/rota.db")
        );
        assert_eq!(
            db_path(root, Path::new("/var/lib/rota.db")),
            PathBuf::from("/var/lib/rota.db")
        );
    }
}
