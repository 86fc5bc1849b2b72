use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotaError {
    #[error("not initialized: run 'rota init'")]
    NotInitialized,

    #[error("no eligible workers in the pool")]
    EmptyPool,

    #[error("worker not found: {0}")]
    WorkerNotFound(String),

    #[error("item not found: {0}")]
    ItemNotFound(u64),

    #[error("invalid worker status '{0}': expected 'active' or 'inactive'")]
    InvalidStatus(String),

    #[error("invalid worker id '{0}'")]
    InvalidWorkerId(String),

    #[error("worker id prefix '{0}' matches more than one worker")]
    AmbiguousWorkerId(String),

    #[error("worker name must not be empty")]
    EmptyName,

    #[error("store unavailable: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RotaError>;
