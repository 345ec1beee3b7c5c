//! Key-value session storage.
//!
//! The store only ever sees opaque strings. Turning a blob into a
//! `SessionRecord` (and refusing to trust a malformed one) happens in
//! `load_record`, never in the store itself.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use shared::types::SessionRecord;

pub trait SessionStore: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, blob: String);
    fn clear(&self, key: &str);
}

/// Process-local store. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        match self.entries.read() {
            Ok(map) => map.get(key).cloned(),
            Err(poisoned) => {
                warn!("Session store lock poisoned on read");
                poisoned.into_inner().get(key).cloned()
            }
        }
    }

    fn write(&self, key: &str, blob: String) {
        let mut map = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.insert(key.to_string(), blob);
    }

    fn clear(&self, key: &str) {
        let mut map = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.remove(key);
    }
}

/// Read and normalize the record stored under `key`. Anything unreadable
/// comes back as the empty (anonymous) record.
pub fn load_record(store: &dyn SessionStore, key: Option<&str>) -> SessionRecord {
    let blob = key.and_then(|k| store.read(k));
    SessionRecord::from_blob(blob.as_deref())
}

pub fn save_record(store: &dyn SessionStore, key: &str, record: &SessionRecord) -> Result<()> {
    let blob = record
        .to_blob()
        .context("Failed to serialize session record")?;
    debug!("Saving session record ({})", record);
    store.write(key, blob);
    Ok(())
}
