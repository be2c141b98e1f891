//! Sync client: optimistic translation of local mutations into persistence
//! calls.
//!
//! DESIGN
//! ======
//! Every network call runs on its own tokio task and pushes exactly one
//! [`SyncEvent`] completion into an unbounded queue; the engine drains the
//! queue on its single thread of control and applies each completion to
//! run-to-completion. Create completions carry the post's client id as the
//! correlation token and the revision the request was sent with, so the
//! engine can reconcile identity without in-memory references and discard
//! fields superseded by a newer local edit.
//!
//! ERROR HANDLING
//! ==============
//! Failures travel inside the completion as `Result`s. The only
//! compensating action is create rollback, decided by the engine;
//! update/delete/snapshot failures degrade to log entries.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::persist::{PersistError, PersistenceApi, PostRecord, SnapshotRecord};
use crate::post::PostId;

/// Completion of one asynchronous persistence call.
#[derive(Debug)]
pub enum SyncEvent {
    /// `list posts` finished (hydration).
    Hydrated { result: Result<serde_json::Value, PersistError> },
    /// `create post` finished for the post created under `id`.
    CreateDone {
        id: PostId,
        /// The post's revision at request time; the engine discards
        /// canonical fields if a newer local edit has happened since.
        sent_revision: i64,
        result: Result<PostRecord, PersistError>,
    },
    /// `update post` finished. Fire-and-forget: logged, never applied.
    UpdateDone { id: PostId, result: Result<(), PersistError> },
    /// `delete post` finished. Fire-and-forget.
    DeleteDone { id: PostId, remote_id: i64, result: Result<(), PersistError> },
    /// `create snapshot` finished.
    SnapshotSaved { version: u64, result: Result<(), PersistError> },
    /// `list snapshots` finished, fetched to restore `version`.
    SnapshotsFetched { version: u64, result: Result<serde_json::Value, PersistError> },
}

/// Spawns persistence calls and funnels their completions to the engine.
pub struct SyncClient {
    api: Arc<dyn PersistenceApi>,
    tx: mpsc::UnboundedSender<SyncEvent>,
}

impl SyncClient {
    /// Create a client and the completion queue the engine will drain.
    #[must_use]
    pub fn new(api: Arc<dyn PersistenceApi>) -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { api, tx }, rx)
    }

    /// Fetch all posts from the service.
    pub fn spawn_hydrate(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.list_posts().await;
            let _ = tx.send(SyncEvent::Hydrated { result });
        });
    }

    /// Create `record` remotely; the completion is matched back to `id`.
    pub fn spawn_create(&self, id: PostId, sent_revision: i64, record: PostRecord) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.create_post(&record).await;
            let _ = tx.send(SyncEvent::CreateDone { id, sent_revision, result });
        });
    }

    /// Save `record` as the durable state of `remote_id`.
    pub fn spawn_update(&self, id: PostId, remote_id: i64, record: PostRecord) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.update_post(remote_id, &record).await.map(|_| ());
            let _ = tx.send(SyncEvent::UpdateDone { id, result });
        });
    }

    /// Delete `remote_id` from the service.
    pub fn spawn_delete(&self, id: PostId, remote_id: i64) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.delete_post(remote_id).await;
            let _ = tx.send(SyncEvent::DeleteDone { id, remote_id, result });
        });
    }

    /// Persist a captured snapshot.
    pub fn spawn_snapshot_save(&self, version: u64, record: SnapshotRecord) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.create_snapshot(&record).await;
            let _ = tx.send(SyncEvent::SnapshotSaved { version, result });
        });
    }

    /// Fetch the snapshot list in order to restore `version`.
    pub fn spawn_snapshot_fetch(&self, version: u64) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.list_snapshots().await;
            let _ = tx.send(SyncEvent::SnapshotsFetched { version, result });
        });
    }
}
