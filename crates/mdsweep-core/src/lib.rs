pub mod config;
pub mod logging;

pub mod assets;
pub mod control;
pub mod events;
pub mod extract;
pub mod reconcile;
