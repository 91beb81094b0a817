use std::path::Path;
use std::sync::Arc;

use crate::domain::clock::{SharedClock, SystemClock};
use crate::domain::registry::MissionRegistry;
use crate::error::Result;
use crate::loader::store::JsonStore;

pub mod api;
pub mod cli;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Loads the record sets in `data_dir` into a registry that writes every change
/// back to the same files.
pub fn open_registry(data_dir: impl AsRef<Path>, clock: SharedClock) -> Result<MissionRegistry> {
    let store = JsonStore::new(data_dir.as_ref());
    log::info!("Opening mission registry in '{}'.", data_dir.as_ref().display());

    let registry = store.open(clock)?;
    log::info!("Mission registry ready.");

    Ok(registry)
}

/// Wall-clock time source for production use.
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}
