use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::catalog::ids::local_id;
use crate::catalog::local_store::LocalRecordStore;
use crate::catalog::notice::{NoticeLog, SyncNotice, SyncOperation};
use crate::catalog::queue::MutationQueue;
use crate::catalog::remote::RemoteCatalog;
use crate::catalog::seed::seed_projects;
use crate::entities::project::{MediaSlot, NewProject, ProjectRecord, ProjectUpdate};
use crate::errors::CatalogError;

/// Where the currently served list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Local,
    Remote,
    Seed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Uninitialized,
    Loading,
    Ready(Source),
}

struct Snapshot {
    state: CatalogState,
    projects: Vec<ProjectRecord>,
}

/// The one list of projects the admin client works on.
///
/// Reads are served cache-first. Every mutation is applied to the in-memory
/// list and written to the local store unconditionally, then handed to the
/// mutation queue for a best-effort remote write. Remote failures never
/// fail an operation; they are recorded as [`SyncNotice`]s.
pub struct CatalogReconciler<L, R>
where
    L: LocalRecordStore,
    R: RemoteCatalog + 'static,
{
    local: L,
    remote: Arc<R>,
    queue: MutationQueue,
    notices: NoticeLog,
    snapshot: RwLock<Snapshot>,
}

impl<L, R> CatalogReconciler<L, R>
where
    L: LocalRecordStore,
    R: RemoteCatalog + 'static,
{
    /// Must be called from inside a tokio runtime: it starts the mutation worker.
    pub fn new(local: L, remote: R) -> Self {
        let remote = Arc::new(remote);
        let notices = NoticeLog::default();
        let queue = MutationQueue::spawn(remote.clone(), notices.clone());

        Self {
            local,
            remote,
            queue,
            notices,
            snapshot: RwLock::new(Snapshot {
                state: CatalogState::Uninitialized,
                projects: Vec::new(),
            }),
        }
    }

    pub fn state(&self) -> CatalogState {
        self.snapshot.read().state
    }

    pub fn projects(&self) -> Vec<ProjectRecord> {
        self.snapshot.read().projects.clone()
    }

    pub fn get(&self, id: i64) -> Option<ProjectRecord> {
        self.snapshot.read().projects.iter().find(|p| p.id == id).cloned()
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    /// Remote failures absorbed since the last call.
    pub fn take_notices(&self) -> Vec<SyncNotice> {
        self.notices.take()
    }

    /// Local if it has records, else Remote if it has records, else Seed.
    /// Remote and Seed results are written to the local store.
    pub async fn load(&self) -> Source {
        self.snapshot.write().state = CatalogState::Loading;

        let cached = self.local.load();
        if !cached.is_empty() {
            debug!(count = cached.len(), "Serving projects from local store");
            return self.become_ready(Source::Local, cached, false);
        }

        match self.remote.list().await {
            Ok(records) if !records.is_empty() => {
                info!(count = records.len(), "Serving projects from remote catalog");
                self.become_ready(Source::Remote, records, true)
            }
            Ok(_) => {
                info!("Remote catalog is empty, serving seed projects");
                self.become_ready(Source::Seed, seed_projects(), true)
            }
            Err(e) => {
                warn!("Remote catalog unavailable, serving seed projects: {}", e);
                self.notices.push(SyncNotice::new(SyncOperation::Load, e));
                self.become_ready(Source::Seed, seed_projects(), true)
            }
        }
    }

    /// Creates a project. Prefers the server-assigned id; when the remote
    /// create fails the record is kept locally under a fresh local id.
    pub async fn add(&self, draft: NewProject) -> Result<ProjectRecord, CatalogError> {
        if draft.has_blank_name() {
            return Err(CatalogError::InvalidRecord("project name must not be empty".into()));
        }
        self.ensure_loaded().await;

        let mut draft = draft;
        draft.readme_content = Some(draft.readme_or_default());

        let remote_result = self.queue.create(draft.clone()).await;

        let mut snapshot = self.snapshot.write();
        let record = match remote_result {
            Ok(record) => {
                if snapshot.projects.iter().any(|p| p.id == record.id) {
                    let fresh = local_id(&snapshot.projects);
                    warn!(project_id = record.id, new_id = fresh, "Re-keying local record that collides with server id");
                    if let Some(existing) = snapshot.projects.iter_mut().find(|p| p.id == record.id) {
                        existing.id = fresh;
                    }
                }
                record
            }
            Err(e) => {
                warn!("Remote create failed, keeping project locally: {}", e);
                self.notices.push(SyncNotice::new(SyncOperation::Create(draft.name.clone()), e));
                let id = local_id(&snapshot.projects);
                draft.into_record(id, Utc::now())
            }
        };

        snapshot.projects.push(record.clone());
        self.persist(&snapshot.projects);
        Ok(record)
    }

    /// Merges `changes` into the record with `id`. `Ok(None)` when no such
    /// record exists; then, as for a blank name, nothing is written or dispatched.
    pub async fn update(&self, id: i64, changes: ProjectUpdate) -> Result<Option<ProjectRecord>, CatalogError> {
        if changes.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(CatalogError::InvalidRecord("project name must not be empty".into()));
        }
        self.ensure_loaded().await;

        let updated = {
            let mut snapshot = self.snapshot.write();
            let Some(record) = snapshot.projects.iter_mut().find(|p| p.id == id) else {
                return Ok(None);
            };
            changes.apply_to(record, Utc::now());
            let updated = record.clone();
            self.persist(&snapshot.projects);
            updated
        };

        if let Err(e) = self.queue.update(id, changes) {
            self.notices.push(SyncNotice::new(SyncOperation::Update(id), e));
        }
        Ok(Some(updated))
    }

    /// Removes the record with `id` if present. The remote delete is
    /// dispatched either way; an absent id is not an error.
    pub async fn delete(&self, id: i64) -> bool {
        self.ensure_loaded().await;

        let removed = {
            let mut snapshot = self.snapshot.write();
            let before = snapshot.projects.len();
            snapshot.projects.retain(|p| p.id != id);
            let removed = snapshot.projects.len() != before;
            if removed {
                self.persist(&snapshot.projects);
            }
            removed
        };

        if let Err(e) = self.queue.delete(id) {
            self.notices.push(SyncNotice::new(SyncOperation::Delete(id), e));
        }
        removed
    }

    /// Stores an uploaded media URL on the record.
    pub async fn attach_media(&self, id: i64, slot: MediaSlot, url: String) -> Result<Option<ProjectRecord>, CatalogError> {
        self.update(id, slot.as_update(url)).await
    }

    /// Re-reads the remote catalog and merges it into the local list by id,
    /// newest `updated_at` winning. Before the first load this is `load`.
    pub async fn refresh(&self) -> Source {
        let current = self.state();
        let CatalogState::Ready(source) = current else {
            return self.load().await;
        };

        if let Err(e) = self.flush().await {
            warn!("Could not drain mutation queue before refresh: {}", e);
        }

        match self.remote.list().await {
            Ok(remote) => {
                let mut snapshot = self.snapshot.write();
                let merged = merge_by_id(&snapshot.projects, remote);
                info!(count = merged.len(), "Merged remote catalog into local list");
                snapshot.projects = merged;
                snapshot.state = CatalogState::Ready(Source::Remote);
                self.persist(&snapshot.projects);
                Source::Remote
            }
            Err(e) => {
                warn!("Refresh failed, keeping current list: {}", e);
                self.notices.push(SyncNotice::new(SyncOperation::Refresh, e));
                source
            }
        }
    }

    /// Waits until every queued remote mutation has been dispatched.
    pub async fn flush(&self) -> Result<(), CatalogError> {
        self.queue.flush().await
    }

    async fn ensure_loaded(&self) {
        if self.state() == CatalogState::Uninitialized {
            self.load().await;
        }
    }

    fn become_ready(&self, source: Source, projects: Vec<ProjectRecord>, write_through: bool) -> Source {
        let mut snapshot = self.snapshot.write();
        if write_through {
            self.persist(&projects);
        }
        snapshot.projects = projects;
        snapshot.state = CatalogState::Ready(source);
        source
    }

    fn persist(&self, projects: &[ProjectRecord]) {
        if let Err(e) = self.local.save(projects) {
            warn!("Failed to write project cache: {}", e);
        }
    }
}

/// Last-write-wins merge. Local order is kept and ties keep the local
/// version; remote-only records are appended in remote order.
pub fn merge_by_id(local: &[ProjectRecord], remote: Vec<ProjectRecord>) -> Vec<ProjectRecord> {
    let local_ids: HashSet<i64> = local.iter().map(|p| p.id).collect();
    let mut shared: HashMap<i64, ProjectRecord> = HashMap::new();
    let mut appended_ids = HashSet::new();
    let mut appended = Vec::new();

    for record in remote {
        if local_ids.contains(&record.id) {
            shared.insert(record.id, record);
        } else if appended_ids.insert(record.id) {
            appended.push(record);
        }
    }

    local
        .iter()
        .map(|mine| match shared.remove(&mine.id) {
            Some(theirs) if theirs.updated_at > mine.updated_at => theirs,
            _ => mine.clone(),
        })
        .chain(appended)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use mockall::{mock, predicate::eq, Sequence};

    use crate::catalog::local_store::MemoryStore;
    use crate::entities::option_fields::PatchString;

    mock! {
        pub Remote {}

        #[async_trait]
        impl RemoteCatalog for Remote {
            async fn list(&self) -> Result<Vec<ProjectRecord>, CatalogError>;
            async fn get(&self, id: i64) -> Result<ProjectRecord, CatalogError>;
            async fn create(&self, project: &NewProject) -> Result<ProjectRecord, CatalogError>;
            async fn update(&self, id: i64, changes: &ProjectUpdate) -> Result<(), CatalogError>;
            async fn delete(&self, id: i64) -> Result<(), CatalogError>;
        }
    }

    fn offline() -> CatalogError {
        CatalogError::Transport("connection refused".into())
    }

    fn record(id: i64, name: &str) -> ProjectRecord {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ProjectRecord {
            id,
            name: name.to_string(),
            short_description: format!("{name} in brief"),
            long_description: String::new(),
            readme_content: format!("# {name}\n\n"),
            technologies: vec!["Rust".into()],
            github_url: None,
            live_url: None,
            video_url: None,
            thumbnail_url: None,
            category: "Backend Development".into(),
            is_featured: false,
            created_at: at,
            updated_at: at,
        }
    }

    fn store_with(records: &[ProjectRecord]) -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_records(records).unwrap())
    }

    fn offline_remote() -> MockRemote {
        let mut remote = MockRemote::new();
        remote.expect_list().returning(|| Err(offline()));
        remote.expect_create().returning(|_| Err(offline()));
        remote.expect_update().returning(|_, _| Err(offline()));
        remote.expect_delete().returning(|_| Err(offline()));
        remote
    }

    #[tokio::test]
    async fn non_empty_local_store_wins_over_remote() {
        let cached = vec![record(1, "A"), record(2, "B")];
        let store = store_with(&cached);
        let blob = store.blob();
        let mut remote = MockRemote::new();
        remote.expect_list().never();

        let catalog = CatalogReconciler::new(store.clone(), remote);

        assert_eq!(catalog.load().await, Source::Local);
        assert_eq!(catalog.projects(), cached);
        assert_eq!(catalog.state(), CatalogState::Ready(Source::Local));
        assert_eq!(store.blob(), blob);
    }

    #[tokio::test]
    async fn empty_local_and_failing_remote_serve_seed() {
        let store = Arc::new(MemoryStore::new());
        let catalog = CatalogReconciler::new(store.clone(), offline_remote());

        assert_eq!(catalog.load().await, Source::Seed);
        assert_eq!(catalog.projects(), seed_projects());
        assert_eq!(store.load(), seed_projects());

        let notices = catalog.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].operation, SyncOperation::Load);
    }

    #[tokio::test]
    async fn empty_remote_also_falls_back_to_seed() {
        let store = Arc::new(MemoryStore::new());
        let mut remote = MockRemote::new();
        remote.expect_list().times(1).returning(|| Ok(Vec::new()));

        let catalog = CatalogReconciler::new(store.clone(), remote);

        assert_eq!(catalog.load().await, Source::Seed);
        assert_eq!(store.load(), seed_projects());
        assert!(catalog.take_notices().is_empty());
    }

    #[tokio::test]
    async fn malformed_local_blob_is_treated_as_empty() {
        let store = Arc::new(MemoryStore::with_blob("definitely not json"));
        let mut remote = MockRemote::new();
        remote.expect_list().returning(|| Ok(vec![record(7, "X")]));

        let catalog = CatalogReconciler::new(store.clone(), remote);

        assert_eq!(catalog.load().await, Source::Remote);
        assert_eq!(store.load(), vec![record(7, "X")]);
    }

    #[tokio::test]
    async fn remote_list_populates_empty_local_store() {
        let store = Arc::new(MemoryStore::new());
        let mut remote = MockRemote::new();
        remote.expect_list().times(1).returning(|| Ok(vec![record(7, "X")]));

        let catalog = CatalogReconciler::new(store.clone(), remote);

        assert_eq!(catalog.load().await, Source::Remote);
        assert_eq!(catalog.projects(), vec![record(7, "X")]);
        assert_eq!(
            serde_json::to_value(store.load()).unwrap(),
            serde_json::to_value(vec![record(7, "X")]).unwrap()
        );
    }

    #[tokio::test]
    async fn offline_creates_get_distinct_ids() {
        let store = store_with(&seed_projects());
        let catalog = CatalogReconciler::new(store.clone(), offline_remote());
        catalog.load().await;

        let mut ids = HashSet::new();
        for n in 0..50 {
            let draft = NewProject { name: format!("Burst {n}"), ..Default::default() };
            let created = catalog.add(draft).await.unwrap();
            assert!(created.id > 0);
            assert!(ids.insert(created.id), "duplicate id {}", created.id);
        }

        let all: HashSet<i64> = catalog.projects().iter().map(|p| p.id).collect();
        assert_eq!(all.len(), 54);
        assert_eq!(store.load().len(), 54);
        assert_eq!(catalog.take_notices().len(), 50);
    }

    #[tokio::test]
    async fn add_prefers_server_record_and_rekeys_collisions() {
        let store = store_with(&seed_projects());
        let mut remote = MockRemote::new();
        remote
            .expect_create()
            .withf(|draft| draft.name == "Atlas")
            .times(1)
            .returning(|draft| {
                let mut created = draft.clone().into_record(2, Utc::now());
                created.short_description = "from server".into();
                Ok(created)
            });

        let catalog = CatalogReconciler::new(store.clone(), remote);
        catalog.load().await;

        let created = catalog
            .add(NewProject { name: "Atlas".into(), long_description: "Maps.".into(), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(created.id, 2);
        assert_eq!(created.short_description, "from server");
        assert_eq!(created.readme_content, "# Atlas\n\nMaps.");

        let projects = catalog.projects();
        let ids: HashSet<i64> = projects.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), projects.len());
        assert_eq!(projects.last().unwrap().name, "Atlas");
        assert!(projects.iter().any(|p| p.name == "MediaFinder" && p.id != 2));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_dispatch() {
        let mut remote = MockRemote::new();
        remote.expect_list().never();
        remote.expect_create().never();

        let catalog = CatalogReconciler::new(Arc::new(MemoryStore::new()), remote);
        let result = catalog.add(NewProject { name: "   ".into(), ..Default::default() }).await;

        assert!(matches!(result, Err(CatalogError::InvalidRecord(_))));
        assert_eq!(catalog.state(), CatalogState::Uninitialized);
    }

    #[tokio::test]
    async fn update_keeps_identity_fields() {
        let original = record(5, "Before");
        let store = store_with(&[original.clone()]);
        let mut remote = MockRemote::new();
        remote.expect_update().with(eq(5), mockall::predicate::always()).times(1).returning(|_, _| Ok(()));

        let catalog = CatalogReconciler::new(store.clone(), remote);
        catalog.load().await;

        let changes = ProjectUpdate {
            name: Some("After".into()),
            live_url: PatchString::SetToValue("https://after.dev".into()),
            ..Default::default()
        };
        let updated = catalog.update(5, changes).await.unwrap().unwrap();
        catalog.flush().await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at >= original.updated_at);
        assert_eq!(updated.name, "After");
        assert_eq!(store.load(), vec![updated]);
        assert!(catalog.take_notices().is_empty());
    }

    #[tokio::test]
    async fn update_of_unknown_id_dispatches_nothing() {
        let store = store_with(&[record(1, "A")]);
        let blob = store.blob();
        let mut remote = MockRemote::new();
        remote.expect_update().never();

        let catalog = CatalogReconciler::new(store.clone(), remote);
        catalog.load().await;

        assert!(catalog.update(99, ProjectUpdate::default()).await.unwrap().is_none());
        catalog.flush().await.unwrap();
        assert_eq!(store.blob(), blob);
    }

    #[tokio::test]
    async fn update_to_blank_name_is_rejected_before_any_write() {
        let store = store_with(&[record(1, "A")]);
        let blob = store.blob();
        let mut remote = MockRemote::new();
        remote.expect_update().never();

        let catalog = CatalogReconciler::new(store.clone(), remote);
        catalog.load().await;

        let result = catalog
            .update(1, ProjectUpdate { name: Some("   ".into()), ..Default::default() })
            .await;
        catalog.flush().await.unwrap();

        assert!(matches!(result, Err(CatalogError::InvalidRecord(_))));
        assert_eq!(catalog.projects(), vec![record(1, "A")]);
        assert_eq!(store.blob(), blob);
        assert!(catalog.take_notices().is_empty());
    }

    #[tokio::test]
    async fn delete_of_absent_id_changes_nothing() {
        let records = vec![record(1, "A"), record(2, "B")];
        let store = store_with(&records);
        let blob = store.blob();
        let mut remote = MockRemote::new();
        remote.expect_delete().with(eq(42)).times(1).returning(|_| Ok(()));

        let catalog = CatalogReconciler::new(store.clone(), remote);
        catalog.load().await;

        assert!(!catalog.delete(42).await);
        catalog.flush().await.unwrap();

        assert_eq!(catalog.projects(), records);
        assert_eq!(store.blob(), blob);
        assert!(catalog.take_notices().is_empty());
    }

    #[tokio::test]
    async fn delete_writes_local_even_when_remote_fails() {
        let store = store_with(&[record(1, "A"), record(2, "B")]);
        let catalog = CatalogReconciler::new(store.clone(), offline_remote());
        catalog.load().await;

        assert!(catalog.delete(2).await);
        catalog.flush().await.unwrap();

        assert_eq!(catalog.projects(), vec![record(1, "A")]);
        assert_eq!(store.load(), vec![record(1, "A")]);
        let notices = catalog.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].operation, SyncOperation::Delete(2));
    }

    #[tokio::test]
    async fn overlapping_mutations_reach_remote_in_order() {
        let store = store_with(&[record(1, "A")]);
        let mut remote = MockRemote::new();
        let mut seq = Sequence::new();
        remote.expect_create().times(1).in_sequence(&mut seq).returning(|draft| Ok(draft.clone().into_record(10, Utc::now())));
        remote.expect_update().with(eq(10), mockall::predicate::always()).times(1).in_sequence(&mut seq).returning(|_, _| Ok(()));
        remote.expect_delete().with(eq(10)).times(1).in_sequence(&mut seq).returning(|_| Ok(()));

        let catalog = CatalogReconciler::new(store.clone(), remote);
        catalog.load().await;

        let created = catalog.add(NewProject { name: "Short-lived".into(), ..Default::default() }).await.unwrap();
        catalog.update(created.id, ProjectUpdate { is_featured: Some(true), ..Default::default() }).await.unwrap();
        catalog.delete(created.id).await;
        catalog.flush().await.unwrap();

        assert_eq!(catalog.projects(), vec![record(1, "A")]);
    }

    #[tokio::test]
    async fn attach_media_sets_thumbnail() {
        let store = store_with(&[record(3, "Clip")]);
        let mut remote = MockRemote::new();
        remote.expect_update().returning(|_, _| Ok(()));

        let catalog = CatalogReconciler::new(store, remote);
        catalog.load().await;

        let updated = catalog
            .attach_media(3, MediaSlot::Thumbnail, "https://cdn.example.com/portfolio/clip.png".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.thumbnail_url.as_deref(), Some("https://cdn.example.com/portfolio/clip.png"));
    }

    #[tokio::test]
    async fn refresh_before_load_behaves_like_load() {
        let mut remote = MockRemote::new();
        remote.expect_list().times(1).returning(|| Ok(vec![record(7, "X")]));

        let catalog = CatalogReconciler::new(Arc::new(MemoryStore::new()), remote);

        assert_eq!(catalog.refresh().await, Source::Remote);
        assert_eq!(catalog.projects(), vec![record(7, "X")]);
    }

    #[tokio::test]
    async fn refresh_merges_instead_of_overwriting() {
        let mut local_only = record(50, "Unsynced draft");
        local_only.is_featured = true;
        let stale = record(1, "Old name");
        let store = store_with(&[stale.clone(), local_only.clone()]);

        let mut newer = record(1, "New name");
        newer.updated_at = stale.updated_at + Duration::hours(1);
        let remote_only = record(2, "Added elsewhere");
        let remote_list = vec![remote_only.clone(), newer.clone()];

        let mut remote = MockRemote::new();
        remote.expect_list().times(1).returning(move || Ok(remote_list.clone()));

        let catalog = CatalogReconciler::new(store.clone(), remote);
        assert_eq!(catalog.load().await, Source::Local);

        assert_eq!(catalog.refresh().await, Source::Remote);

        let expected = vec![newer, local_only, remote_only];
        assert_eq!(catalog.projects(), expected);
        assert_eq!(store.load(), expected);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_list() {
        let store = store_with(&[record(1, "A")]);
        let catalog = CatalogReconciler::new(store, offline_remote());
        catalog.load().await;

        assert_eq!(catalog.refresh().await, Source::Local);
        assert_eq!(catalog.projects(), vec![record(1, "A")]);
        assert_eq!(catalog.take_notices()[0].operation, SyncOperation::Refresh);
    }

    #[test]
    fn merge_ties_keep_local_version() {
        let mine = record(1, "Mine");
        let theirs = record(1, "Theirs");

        let merged = merge_by_id(&[mine.clone()], vec![theirs]);

        assert_eq!(merged, vec![mine]);
    }

    #[test]
    fn merge_drops_duplicate_remote_ids() {
        let merged = merge_by_id(&[], vec![record(4, "first"), record(4, "second")]);
        assert_eq!(merged, vec![record(4, "first")]);
    }
}
