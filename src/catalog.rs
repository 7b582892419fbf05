//! Client-side project catalog: a local record store kept in step with the
//! remote catalog, with compiled-in seed data as the last fallback.

pub mod ids;
pub mod local_store;
pub mod notice;
pub mod queue;
pub mod reconciler;
pub mod remote;
pub mod seed;

pub use local_store::{JsonFileStore, LocalRecordStore, MemoryStore};
pub use notice::{NoticeLog, SyncNotice, SyncOperation};
pub use reconciler::{CatalogReconciler, CatalogState, Source};
pub use remote::{HttpCatalogClient, RemoteCatalog};
