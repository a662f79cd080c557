use super::PreferenceStore;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "prefs";

/// Preference store backed by a fjall keyspace. Every write is synced so the
/// value survives the process exiting right after a toggle.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open preference store: {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open preference partition")?;

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl PreferenceStore for DiskStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .partition
            .get(key.as_bytes())
            .with_context(|| format!("Failed to read preference: {key}"))?;

        match value {
            Some(bytes) => {
                let value = String::from_utf8(bytes.to_vec())
                    .with_context(|| format!("Preference is not valid UTF-8: {key}"))?;
                debug!("Preference HIT for key: {}", key);
                Ok(Some(value))
            }
            None => {
                debug!("Preference MISS for key: {}", key);
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.partition
            .insert(key.as_bytes(), value.as_bytes())
            .with_context(|| format!("Failed to write preference: {key}"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist preferences")?;
        debug!("Preference PUT for key: {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_disk_store_get_set() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();

        assert_eq!(store.get("theme").unwrap(), None);
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }
}
