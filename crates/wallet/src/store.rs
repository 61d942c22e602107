use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tracing::warn;

pub(crate) const LOG_TARGET: &str = "tzdapp::wallet::store";

/// Storage key of the persisted connection flag.
pub const WALLET_CONNECTED_KEY: &str = "provider:wallet-connected";

/// Client-local persistent storage for session state. Every session owns an
/// injected store; there is no process-wide one.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory store. Sessions do not survive the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

/// Store persisting entries as a JSON map on disk, so a session can be
/// restored after a reload.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, reading existing entries when the file is
    /// already present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Malformed session store file: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read session store: {}", path.display()));
            }
        };
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let result = serde_json::to_vec_pretty(entries)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| fs::write(&self.path, bytes).map_err(Into::into));
        if let Err(error) = result {
            warn!(
                target: LOG_TARGET,
                path = %self.path.display(),
                error = %error,
                "Failed to persist session store."
            );
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        entries.remove(key);
        self.persist(&entries);
    }
}
