pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use anyhow::Result;
use disk::DiskStore;
use memory::MemoryStore;
use std::sync::Arc;
use tracing::warn;

/// A small string key-value store for user preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Opens the on-disk preference store under the configured data directory,
/// falling back to an in-memory store if it cannot be opened.
pub fn open_default(config: &AppConfig) -> Arc<dyn PreferenceStore> {
    let opened = config
        .default_data_path()
        .and_then(|path| DiskStore::open(&path.join("prefs")));

    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Preferences will not be persisted");
            Arc::new(MemoryStore::new())
        }
    }
}
