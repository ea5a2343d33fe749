use super::{MemoryStore, ValueStore};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Value store persisted as JSON between runs.
///
/// Loading a missing or unreadable file starts from an empty store; the
/// counters simply re-initialise.
#[derive(Debug, Default)]
pub struct FileStore {
    path:  Option<PathBuf>,
    inner: MemoryStore,
}

pub fn default_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("levelwatch").join("value_store.json"))
}

impl FileStore {
    pub fn load(path: &Path) -> Self {
        let inner = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str::<MemoryStore>(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable value store");
                MemoryStore::default()
            }),
            Err(_) => MemoryStore::default(),
        };
        Self { path: Some(path.to_path_buf()), inner }
    }

    pub fn len(&self) -> usize { self.inner.len() }
    pub fn is_empty(&self) -> bool { self.inner.is_empty() }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else { return Ok(()) };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&self.inner)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl ValueStore for FileStore {
    fn get(&self, key: &str) -> Option<(f64, f64)> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, timestamp: f64, value: f64) {
        self.inner.set(key, timestamp, value);
    }
}
