//! Canvas engine: single owner of the registry, bodies, drag state,
//! snapshot history, event log, and the sync completion queue.
//!
//! DESIGN
//! ======
//! The engine runs on one logical thread of control: pointer/edit handlers,
//! integrator ticks, and sync completions each run to completion without
//! preemption, so registry mutations never need locks. The `pinned` flag is
//! the sole mutual-exclusion device between the integrator and a drag in
//! progress. Network I/O happens on tokio tasks owned by [`SyncClient`];
//! their completions queue up until the driver drains them here.
//!
//! ERROR HANDLING
//! ==============
//! No failure halts the engine. Create failures roll the post back; every
//! other failure (update, delete, snapshot save, fetch) degrades to an
//! event-log entry plus a `tracing` warning. Wire payloads that should be
//! sequences but are not are rejected as no-ops preserving prior state.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::f64::consts::TAU;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::consts::{DEFAULT_MASS, DEFAULT_ORBIT_RADIUS, DEFAULT_ORBIT_SPEED, ORBIT_CENTER_X, ORBIT_CENTER_Y};
use crate::input::DragState;
use crate::log::EventLog;
use crate::orbit::{self, AngleSource, BodyTable, OrbitBody};
use crate::persist::{PersistenceApi, PostRecord, SnapshotRecord};
use crate::post::{PartialPost, Point, Post, PostId, SyncState};
use crate::registry::PostStore;
use crate::snapshot::{SnapshotHistory, SnapshotPost};
use crate::sync::{SyncClient, SyncEvent};

/// Engine construction parameters.
pub struct EngineConfig {
    /// Fixed canvas reference point all orbits circle around.
    pub center: Point,
    /// Seed for default orbit angles; `None` draws from OS entropy.
    pub angle_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { center: Point::new(ORBIT_CENTER_X, ORBIT_CENTER_Y), angle_seed: None }
    }
}

/// The canvas post simulation and synchronization engine.
pub struct Engine {
    registry: PostStore,
    bodies: BodyTable,
    drag: DragState,
    angles: AngleSource,
    history: SnapshotHistory,
    log: EventLog,
    sync: SyncClient,
    completions: mpsc::UnboundedReceiver<SyncEvent>,
    center: Point,
}

impl Engine {
    /// Create an engine backed by the given persistence service.
    #[must_use]
    pub fn new(api: Arc<dyn PersistenceApi>, config: EngineConfig) -> Self {
        let (sync, completions) = SyncClient::new(api);
        let angles = match config.angle_seed {
            Some(seed) => AngleSource::from_seed(seed),
            None => AngleSource::from_entropy(),
        };
        Self {
            registry: PostStore::new(),
            bodies: BodyTable::new(),
            drag: DragState::Idle,
            angles,
            history: SnapshotHistory::new(),
            log: EventLog::new(),
            sync,
            completions,
            center: config.center,
        }
    }

    // --- Local mutations ---

    /// Add a post at the given position. Visible and animatable
    /// immediately; the create request is confirmed asynchronously.
    pub fn add_post(&mut self, title: &str, content: &str, x: f64, y: f64) -> PostId {
        let angle = self.angles.next_angle();
        let post = Post::new(title.to_owned(), content.to_owned(), x, y, angle);
        let id = post.id;
        let record = PostRecord::from_post(&post);
        let sent_revision = post.revision;

        self.bodies.insert(id, x, y);
        self.registry.insert(post);
        self.log.record("post:create", "registry", json!({"id": id, "title": title}));
        self.sync.spawn_create(id, sent_revision, record);
        id
    }

    /// Delete a post immediately and unconditionally; the remote delete is
    /// fire-and-forget. Returns false if the post doesn't exist.
    pub fn delete_post(&mut self, id: &PostId) -> bool {
        let Some(post) = self.registry.remove(id) else {
            return false;
        };
        if self.drag.dragging_id() == Some(*id) {
            self.drag = DragState::Idle;
        }
        self.bodies.remove(id);
        self.log.record("post:delete", "registry", json!({"id": id}));

        match post.remote_id {
            Some(remote_id) => self.sync.spawn_delete(*id, remote_id),
            None => {
                // Create still in flight; its completion finds no post and
                // the server row (if any) stays orphaned.
                self.log.record("sync:delete:skipped", "sync", json!({"id": id}));
            }
        }
        true
    }

    // --- Drag interaction ---

    /// Begin dragging a post: pin it and capture the pointer offset.
    /// Ignored if another drag is in progress (single active pointer) or
    /// the post doesn't exist.
    pub fn on_drag_start(&mut self, id: &PostId, pointer: Point) -> bool {
        if self.drag.dragging_id().is_some() {
            return false;
        }
        let Some(post) = self.registry.get_mut(id) else {
            return false;
        };
        post.pinned = true;
        let offset = Point::new(pointer.x - post.x, pointer.y - post.y);
        self.drag = DragState::Dragging { id: *id, offset };
        self.log.record("drag:start", "input", json!({"id": id}));
        true
    }

    /// Commit the dragged post's position for this pointer move. Every
    /// move event commits synchronously; there is no throttling.
    pub fn on_drag_move(&mut self, pointer: Point) {
        let DragState::Dragging { id, offset } = self.drag else {
            return;
        };
        let x = pointer.x - offset.x;
        let y = pointer.y - offset.y;
        let partial = PartialPost { x: Some(x), y: Some(y), ..PartialPost::default() };
        if self.registry.apply_partial(&id, &partial).is_some() {
            self.bodies.mirror(&id, x, y);
        }
    }

    /// End the drag: unpin the post and queue an asynchronous position
    /// update.
    pub fn on_drag_end(&mut self) {
        let DragState::Dragging { id, .. } = self.drag else {
            return;
        };
        self.drag = DragState::Idle;
        let Some(post) = self.registry.get_mut(&id) else {
            return;
        };
        post.pinned = false;
        post.revision += 1;
        self.log.record("drag:end", "input", json!({"id": id, "x": post.x, "y": post.y}));
        self.queue_save(&id);
    }

    // --- Edit interaction ---

    /// Enter edit mode on a post (secondary activation gesture).
    pub fn begin_edit(&mut self, id: &PostId) -> bool {
        let Some(post) = self.registry.get_mut(id) else {
            return false;
        };
        post.editing = true;
        self.log.record("edit:begin", "input", json!({"id": id}));
        true
    }

    /// Apply one keystroke's worth of text locally.
    pub fn edit_text(&mut self, id: &PostId, title: &str, content: &str) {
        let partial = PartialPost {
            title: Some(title.to_owned()),
            content: Some(content.to_owned()),
            ..PartialPost::default()
        };
        let _ = self.registry.apply_partial(id, &partial);
    }

    /// Leave edit mode and queue an asynchronous save (text field blur).
    pub fn commit_edit(&mut self, id: &PostId) {
        let Some(post) = self.registry.get_mut(id) else {
            return;
        };
        post.editing = false;
        post.revision += 1;
        self.log.record("edit:commit", "input", json!({"id": id}));
        self.queue_save(id);
    }

    /// Pointer activity outside every post: exit edit mode everywhere,
    /// leaving the posts otherwise untouched.
    pub fn on_pointer_outside(&mut self) {
        let mut cleared = 0;
        for post in self.registry.posts_mut() {
            if post.editing {
                post.editing = false;
                cleared += 1;
            }
        }
        if cleared > 0 {
            self.log.record("edit:clear", "input", json!({"cleared": cleared}));
        }
    }

    /// Queue a durable save for a post, or log the skip while its create
    /// is still unconfirmed.
    fn queue_save(&mut self, id: &PostId) {
        let Some(post) = self.registry.get(id) else {
            return;
        };
        match post.remote_id {
            Some(remote_id) => {
                self.sync.spawn_update(*id, remote_id, PostRecord::update_body(post));
            }
            None => {
                self.log.record("sync:update:skipped", "sync", json!({"id": id}));
            }
        }
    }

    // --- Simulation ---

    /// Advance the orbital simulation by one tick.
    pub fn tick(&mut self) {
        orbit::step(&mut self.registry, &mut self.bodies, self.center);
    }

    // --- Snapshots ---

    /// Capture the canvas into the next snapshot version and persist it
    /// fire-and-forget. Returns the version.
    pub fn capture_snapshot(&mut self) -> u64 {
        let snapshot = self.history.capture(&self.registry);
        let version = snapshot.version;
        self.log.record(
            "snapshot:capture",
            "snapshot",
            json!({"version": version, "posts": snapshot.posts.len()}),
        );
        self.sync.spawn_snapshot_save(version, snapshot.to_record());
        version
    }

    /// Request a restore of `version`. The snapshot list is fetched
    /// asynchronously; the registry is replaced when the fetch completes
    /// and the version exists.
    pub fn restore_snapshot(&mut self, version: u64) {
        self.sync.spawn_snapshot_fetch(version);
    }

    // --- Hydration ---

    /// Request a full fetch of the canvas from the persistence service.
    pub fn request_hydrate(&mut self) {
        self.sync.spawn_hydrate();
    }

    // --- Completion queue ---

    /// Apply every queued sync completion. Returns how many were applied.
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.completions.try_recv() {
            self.apply_completion(event);
            applied += 1;
        }
        applied
    }

    /// Await and apply a single sync completion. Returns false if the
    /// queue has closed.
    pub async fn pump_completion(&mut self) -> bool {
        match self.completions.recv().await {
            Some(event) => {
                self.apply_completion(event);
                true
            }
            None => false,
        }
    }

    fn apply_completion(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Hydrated { result } => match result {
                Ok(body) => self.apply_hydration(&body),
                Err(e) => {
                    warn!(error = %e, "hydration fetch failed");
                    self.log.record("hydrate:failed", "sync", json!({"error": e.to_string()}));
                }
            },

            SyncEvent::CreateDone { id, sent_revision, result } => match result {
                Ok(record) => self.reconcile_create(id, sent_revision, &record),
                Err(e) => {
                    // Rollback: the optimistic post and its body disappear.
                    if self.drag.dragging_id() == Some(id) {
                        self.drag = DragState::Idle;
                    }
                    self.registry.remove(&id);
                    self.bodies.remove(&id);
                    warn!(id = %id, error = %e, "create failed; post rolled back");
                    self.log
                        .record("sync:create:failed", "sync", json!({"id": id, "error": e.to_string()}));
                }
            },

            SyncEvent::UpdateDone { id, result } => match result {
                Ok(()) => debug!(id = %id, "update confirmed"),
                Err(e) => {
                    // Fire-and-forget: local state may now diverge from the
                    // server; no rollback, no retry.
                    warn!(id = %id, error = %e, "update failed");
                    self.log
                        .record("sync:update:failed", "sync", json!({"id": id, "error": e.to_string()}));
                }
            },

            SyncEvent::DeleteDone { id, remote_id, result } => match result {
                Ok(()) => debug!(id = %id, remote_id, "delete confirmed"),
                Err(e) => {
                    warn!(id = %id, remote_id, error = %e, "delete failed");
                    self.log.record(
                        "sync:delete:failed",
                        "sync",
                        json!({"id": id, "remote_id": remote_id, "error": e.to_string()}),
                    );
                }
            },

            SyncEvent::SnapshotSaved { version, result } => match result {
                Ok(()) => debug!(version, "snapshot persisted"),
                Err(e) => {
                    warn!(version, error = %e, "snapshot persist failed");
                    self.log.record(
                        "snapshot:save:failed",
                        "snapshot",
                        json!({"version": version, "error": e.to_string()}),
                    );
                }
            },

            SyncEvent::SnapshotsFetched { version, result } => match result {
                Ok(body) => self.apply_restore(version, &body),
                Err(e) => {
                    warn!(version, error = %e, "snapshot list fetch failed; restore aborted");
                    self.log.record(
                        "snapshot:restore:failed",
                        "snapshot",
                        json!({"version": version, "error": e.to_string()}),
                    );
                }
            },
        }
    }

    /// Replace the canvas with the fetched post records.
    fn apply_hydration(&mut self, body: &serde_json::Value) {
        let Some(entries) = body.as_array() else {
            warn!("hydration payload is not a sequence; keeping current state");
            self.log.record("hydrate:malformed", "sync", json!({}));
            return;
        };

        let mut posts = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<PostRecord>(entry.clone()) {
                Ok(record) => posts.push(self.post_from_record(&record)),
                Err(e) => warn!(error = %e, "skipping malformed post record"),
            }
        }

        self.bodies.clear();
        for post in &posts {
            self.bodies.insert(post.id, post.x, post.y);
        }
        let count = posts.len();
        self.registry.replace_all(posts);
        self.drag = DragState::Idle;
        self.log.record("hydrate:done", "sync", json!({"posts": count}));
    }

    /// Attach the canonical identity to an optimistically created post,
    /// matched by its client id. Canonical card text is applied only if no
    /// newer local edit has happened since the request left; position and
    /// physics parameters always stay client-authoritative so the echo
    /// never rewinds a post that kept moving while the request was in
    /// flight.
    fn reconcile_create(&mut self, id: PostId, sent_revision: i64, record: &PostRecord) {
        let Some(post) = self.registry.get_mut(&id) else {
            warn!(id = %id, remote_id = ?record.id, "create confirmed for a post deleted in the meantime");
            self.log
                .record("sync:create:orphaned", "sync", json!({"id": id, "remote_id": record.id}));
            return;
        };
        post.remote_id = record.id;
        post.sync_state = SyncState::Synced;
        if post.revision == sent_revision {
            post.title = record.title.clone();
            post.content = record.content.clone();
        }
        self.log
            .record("sync:create:done", "sync", json!({"id": id, "remote_id": record.id}));
    }

    /// Apply a fetched snapshot list: locate `version` and wholesale-replace
    /// the registry, or leave it untouched if anything is off.
    fn apply_restore(&mut self, version: u64, body: &serde_json::Value) {
        let Some(entries) = body.as_array() else {
            warn!(version, "snapshot list is not a sequence; restore aborted");
            self.log
                .record("snapshot:restore:malformed", "snapshot", json!({"version": version}));
            return;
        };

        let records: Vec<SnapshotRecord> = entries
            .iter()
            .filter_map(|entry| match serde_json::from_value(entry.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "skipping malformed snapshot record");
                    None
                }
            })
            .collect();

        let Some(record) = records.iter().find(|r| r.version == version) else {
            warn!(version, "snapshot version not found; restore aborted");
            self.log
                .record("snapshot:restore:not_found", "snapshot", json!({"version": version}));
            return;
        };

        let Some(data) = record.snapshot_data.as_array() else {
            warn!(version, "snapshot data is not a sequence; restore aborted");
            self.log
                .record("snapshot:restore:malformed", "snapshot", json!({"version": version}));
            return;
        };

        let mut posts = Vec::with_capacity(data.len());
        for entry in data {
            match serde_json::from_value::<SnapshotPost>(entry.clone()) {
                Ok(sp) => posts.push(self.post_from_snapshot(&sp)),
                Err(e) => warn!(error = %e, "skipping malformed snapshot post"),
            }
        }

        // Full replace, not merge: posts created after the capture are
        // discarded from view, and no bodies survive — motion resumes from
        // fresh defaults.
        self.bodies.clear();
        let count = posts.len();
        self.registry.replace_all(posts);
        self.drag = DragState::Idle;
        self.log.record(
            "snapshot:restore",
            "snapshot",
            json!({"version": version, "posts": count}),
        );
    }

    /// Build a live post from a service record, filling absent physics
    /// parameters with defaults.
    fn post_from_record(&mut self, record: &PostRecord) -> Post {
        let orbit_angle = match record.angle {
            Some(angle) => angle.rem_euclid(TAU),
            None => self.angles.next_angle(),
        };
        Post {
            id: uuid::Uuid::new_v4(),
            remote_id: record.id,
            title: record.title.clone(),
            content: record.content.clone(),
            x: record.position_x,
            y: record.position_y,
            editing: false,
            pinned: false,
            mass: record.mass.unwrap_or(DEFAULT_MASS),
            orbit_radius: record.orbit_radius.unwrap_or(DEFAULT_ORBIT_RADIUS),
            orbit_angle,
            orbit_speed: record.velocity.unwrap_or(DEFAULT_ORBIT_SPEED),
            sync_state: SyncState::Synced,
            revision: 1,
            seq: 0,
        }
    }

    /// Build a live post from a captured snapshot entry: recorded card
    /// state, fresh default motion.
    fn post_from_snapshot(&mut self, sp: &SnapshotPost) -> Post {
        let mut post = Post::new(sp.title.clone(), sp.content.clone(), sp.x, sp.y, self.angles.next_angle());
        post.remote_id = sp.remote_id;
        post.sync_state = SyncState::Synced;
        post
    }

    // --- Queries ---

    /// All posts in creation order.
    #[must_use]
    pub fn posts(&self) -> Vec<&Post> {
        self.registry.ordered_posts()
    }

    /// Look up a post by id.
    #[must_use]
    pub fn post(&self, id: &PostId) -> Option<&Post> {
        self.registry.get(id)
    }

    /// The post currently being dragged, if any.
    #[must_use]
    pub fn dragging_id(&self) -> Option<PostId> {
        self.drag.dragging_id()
    }

    /// A post's body mirror, if it has one.
    #[must_use]
    pub fn body(&self, id: &PostId) -> Option<&OrbitBody> {
        self.bodies.get(id)
    }

    /// The local snapshot history.
    #[must_use]
    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// The append-only event log.
    #[must_use]
    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// The fixed orbit center.
    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }
}
