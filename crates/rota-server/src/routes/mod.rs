pub mod config;
pub mod items;
pub mod reconcile;
pub mod stats;
pub mod workers;
