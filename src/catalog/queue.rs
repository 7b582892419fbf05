use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::catalog::notice::{NoticeLog, SyncNotice, SyncOperation};
use crate::catalog::remote::RemoteCatalog;
use crate::entities::project::{NewProject, ProjectRecord, ProjectUpdate};
use crate::errors::CatalogError;

enum Mutation {
    Create {
        project: NewProject,
        reply: oneshot::Sender<Result<ProjectRecord, CatalogError>>,
    },
    Update {
        id: i64,
        changes: ProjectUpdate,
    },
    Delete {
        id: i64,
    },
    Flush {
        done: oneshot::Sender<()>,
    },
}

/// Serializes remote mutations: one worker dispatches them strictly in
/// submission order, so overlapping writes to the same id cannot race.
pub struct MutationQueue {
    tx: mpsc::UnboundedSender<Mutation>,
}

impl MutationQueue {
    /// Starts the worker. Must be called from inside a tokio runtime.
    pub fn spawn<R>(remote: Arc<R>, notices: NoticeLog) -> Self
    where
        R: RemoteCatalog + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(remote, rx, notices));
        Self { tx }
    }

    /// Submits a create and waits for the server's canonical record.
    pub async fn create(&self, project: NewProject) -> Result<ProjectRecord, CatalogError> {
        let (reply, response) = oneshot::channel();
        self.send(Mutation::Create { project, reply })?;
        response.await.map_err(|_| CatalogError::QueueClosed)?
    }

    pub fn update(&self, id: i64, changes: ProjectUpdate) -> Result<(), CatalogError> {
        self.send(Mutation::Update { id, changes })
    }

    pub fn delete(&self, id: i64) -> Result<(), CatalogError> {
        self.send(Mutation::Delete { id })
    }

    /// Resolves once every mutation submitted earlier has been dispatched.
    pub async fn flush(&self) -> Result<(), CatalogError> {
        let (done, flushed) = oneshot::channel();
        self.send(Mutation::Flush { done })?;
        flushed.await.map_err(|_| CatalogError::QueueClosed)
    }

    fn send(&self, mutation: Mutation) -> Result<(), CatalogError> {
        self.tx.send(mutation).map_err(|_| CatalogError::QueueClosed)
    }
}

async fn run_worker<R>(remote: Arc<R>, mut rx: mpsc::UnboundedReceiver<Mutation>, notices: NoticeLog)
where
    R: RemoteCatalog + 'static,
{
    while let Some(mutation) = rx.recv().await {
        match mutation {
            Mutation::Create { project, reply } => {
                let result = remote.create(&project).await;
                if reply.send(result).is_err() {
                    debug!("Create caller went away before the reply");
                }
            }
            Mutation::Update { id, changes } => {
                if let Err(e) = remote.update(id, &changes).await {
                    warn!(project_id = id, "Remote update failed: {}", e);
                    notices.push(SyncNotice::new(SyncOperation::Update(id), e));
                }
            }
            Mutation::Delete { id } => {
                if let Err(e) = remote.delete(id).await {
                    if e.is_not_found() {
                        continue;
                    }
                    warn!(project_id = id, "Remote delete failed: {}", e);
                    notices.push(SyncNotice::new(SyncOperation::Delete(id), e));
                }
            }
            Mutation::Flush { done } => {
                let _ = done.send(());
            }
        }
    }
    debug!("Mutation queue drained");
}
