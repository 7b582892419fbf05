use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::errors::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOperation {
    Load,
    Refresh,
    /// Carries the draft's name; the record has no server id yet.
    Create(String),
    Update(i64),
    Delete(i64),
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOperation::Load => write!(f, "load"),
            SyncOperation::Refresh => write!(f, "refresh"),
            SyncOperation::Create(name) => write!(f, "create of project {name:?}"),
            SyncOperation::Update(id) => write!(f, "update of project {id}"),
            SyncOperation::Delete(id) => write!(f, "delete of project {id}"),
        }
    }
}

/// A remote failure the catalog absorbed instead of surfacing as an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncNotice {
    pub operation: SyncOperation,
    pub error: CatalogError,
    pub at: DateTime<Utc>,
}

impl SyncNotice {
    pub fn new(operation: SyncOperation, error: CatalogError) -> Self {
        Self { operation, error, at: Utc::now() }
    }
}

impl fmt::Display for SyncNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remote {} failed: {}", self.operation, self.error)
    }
}

/// Notices shared between the reconciler and the mutation worker.
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    entries: Arc<Mutex<Vec<SyncNotice>>>,
}

impl NoticeLog {
    pub fn push(&self, notice: SyncNotice) {
        self.entries.lock().push(notice);
    }

    pub fn take(&self) -> Vec<SyncNotice> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
