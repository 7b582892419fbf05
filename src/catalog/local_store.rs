use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::entities::project::ProjectRecord;
use crate::errors::CatalogError;

/// Durable slot holding the whole project list as one serialized blob.
///
/// `load` never fails: a missing or unreadable blob reads as empty.
pub trait LocalRecordStore: Send + Sync {
    fn load(&self) -> Vec<ProjectRecord>;
    fn save(&self, records: &[ProjectRecord]) -> Result<(), CatalogError>;
}

impl<T: LocalRecordStore + ?Sized> LocalRecordStore for Arc<T> {
    fn load(&self) -> Vec<ProjectRecord> {
        (**self).load()
    }

    fn save(&self, records: &[ProjectRecord]) -> Result<(), CatalogError> {
        (**self).save(records)
    }
}

fn encode(records: &[ProjectRecord]) -> Result<String, CatalogError> {
    serde_json::to_string_pretty(records).map_err(CatalogError::from)
}

fn decode(blob: &str, origin: &str) -> Vec<ProjectRecord> {
    match serde_json::from_str::<Vec<ProjectRecord>>(blob) {
        Ok(records) => records,
        Err(e) => {
            warn!(origin, "Ignoring malformed project cache: {}", e);
            Vec::new()
        }
    }
}

/// Stores the list as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self { path: dir.as_ref().join(format!("{key}.json")) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalRecordStore for JsonFileStore {
    fn load(&self) -> Vec<ProjectRecord> {
        let origin = self.path.display().to_string();
        match fs::read_to_string(&self.path) {
            Ok(blob) => decode(&blob, &origin),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(origin, "No project cache yet");
                Vec::new()
            }
            Err(e) => {
                warn!(origin, "Could not read project cache: {}", e);
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[ProjectRecord]) -> Result<(), CatalogError> {
        let blob = encode(records)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Readers never observe a half-written file.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, blob)?;
        fs::rename(&staging, &self.path)?;

        debug!(path = %self.path.display(), count = records.len(), "Project cache saved");
        Ok(())
    }
}

/// In-process store with the same blob semantics as [`JsonFileStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose slot already holds `blob`, valid or not.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self { blob: Mutex::new(Some(blob.into())) }
    }

    pub fn with_records(records: &[ProjectRecord]) -> Result<Self, CatalogError> {
        Ok(Self::with_blob(encode(records)?))
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().clone()
    }
}

impl LocalRecordStore for MemoryStore {
    fn load(&self) -> Vec<ProjectRecord> {
        match self.blob.lock().as_deref() {
            Some(blob) => decode(blob, "memory"),
            None => Vec::new(),
        }
    }

    fn save(&self, records: &[ProjectRecord]) -> Result<(), CatalogError> {
        let blob = encode(records)?;
        *self.blob.lock() = Some(blob);
        Ok(())
    }
}
