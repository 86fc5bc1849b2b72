pub mod assigner;
pub mod config;
pub mod db;
pub mod error;
pub mod io;
pub mod item;
pub mod paths;
pub mod reconcile;
pub mod resolver;
pub mod stats;
pub mod store;
pub mod types;
pub mod worker;

pub use error::{Result, RotaError};
