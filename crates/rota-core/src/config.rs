use crate::db::RotaDb;
use crate::error::{Result, RotaError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentConfig {
    /// Fire the single-item assigner when an item is created.
    #[serde(default = "default_assign_on_create")]
    pub assign_on_create: bool,
}

fn default_assign_on_create() -> bool {
    true
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            assign_on_create: default_assign_on_create(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Scheduled sweep run by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub interval_secs: u64,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default)]
    pub assignment: AssignmentConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconcile: Option<ReconcileConfig>,
}

fn default_version() -> u32 {
    1
}

fn default_database() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DB_FILE)
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            database: default_database(),
            assignment: AssignmentConfig::default(),
            server: ServerConfig::default(),
            reconcile: None,
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(RotaError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        crate::io::atomic_write(&path, self.to_yaml()?.as_bytes())
    }

    pub fn db_path(&self, root: &Path) -> PathBuf {
        paths::db_path(root, &self.database)
    }

    pub fn open_db(&self, root: &Path) -> Result<RotaDb> {
        RotaDb::open(&self.db_path(root))
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.project.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "project.name is empty".to_string(),
            });
        }

        if let Some(r) = &self.reconcile {
            if r.interval_secs == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "reconcile.interval_secs must be greater than 0".to_string(),
                });
            } else if r.interval_secs < 10 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "reconcile.interval_secs={} is very short (<10s)",
                        r.interval_secs
                    ),
                });
            }
        }

        if !self.assignment.assign_on_create && self.reconcile.is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "assign_on_create is off and no reconcile schedule is set: \
                          items are only assigned by a manual 'rota reconcile'"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
