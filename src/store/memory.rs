use super::PreferenceStore;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory preference store, used when nothing can be persisted and in tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .inner
            .read()
            .map_err(|_| anyhow!("Preference store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .inner
            .write()
            .map_err(|_| anyhow!("Preference store lock poisoned"))?;
        debug!("Preference PUT for key: {}", key);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
