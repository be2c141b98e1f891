//! Post model: the canvas entity and its sparse-update type.
//!
//! A `Post` is one draggable, editable card on the infinite canvas. Its
//! identity is a client-generated uuid that stays stable for the whole local
//! lifetime and doubles as the correlation token for create reconciliation;
//! the server-canonical integer id is attached separately once the
//! persistence service confirms the create.

#[cfg(test)]
#[path = "post_test.rs"]
mod post_test;

use uuid::Uuid;

use crate::consts::{DEFAULT_MASS, DEFAULT_ORBIT_RADIUS, DEFAULT_ORBIT_SPEED};

/// Unique client-side identifier for a post.
pub type PostId = Uuid;

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Synchronization state of a post against the persistence service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Created locally; the create request has not yet been confirmed.
    PendingCreate,
    /// Known to the service under `remote_id`.
    Synced,
}

/// A post as held in the registry.
#[derive(Debug, Clone)]
pub struct Post {
    /// Client-generated identity; also the create correlation token.
    pub id: PostId,
    /// Server-canonical identity, once confirmed.
    pub remote_id: Option<i64>,
    /// Card title.
    pub title: String,
    /// Card body text.
    pub content: String,
    /// World x coordinate.
    pub x: f64,
    /// World y coordinate.
    pub y: f64,
    /// The post's text fields are being edited in place.
    pub editing: bool,
    /// Excluded from the orbit integrator while true (drag in progress).
    pub pinned: bool,
    /// Mass, carried for the body mirror.
    pub mass: f64,
    /// Orbit radius in world units.
    pub orbit_radius: f64,
    /// Orbit phase, always normalized to `[0, 2π)`.
    pub orbit_angle: f64,
    /// Orbit advance per tick, in radians.
    pub orbit_speed: f64,
    /// Sync lifecycle state.
    pub sync_state: SyncState,
    /// Local logical edit counter; attached to every outgoing request so
    /// stale completions can be discarded.
    pub revision: i64,
    /// Registry insertion sequence; gives listings a stable creation order.
    pub seq: u64,
}

impl Post {
    /// A freshly added local post with default physics, pending creation.
    #[must_use]
    pub fn new(title: String, content: String, x: f64, y: f64, orbit_angle: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            remote_id: None,
            title,
            content,
            x,
            y,
            editing: false,
            pinned: false,
            mass: DEFAULT_MASS,
            orbit_radius: DEFAULT_ORBIT_RADIUS,
            orbit_angle,
            orbit_speed: DEFAULT_ORBIT_SPEED,
            sync_state: SyncState::PendingCreate,
            revision: 1,
            seq: 0,
        }
    }

    /// Current position as a point.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Sparse update for a post. Only present fields are applied.
#[derive(Debug, Clone, Default)]
pub struct PartialPost {
    /// New title, if being updated.
    pub title: Option<String>,
    /// New content, if being updated.
    pub content: Option<String>,
    /// New x position, if being updated.
    pub x: Option<f64>,
    /// New y position, if being updated.
    pub y: Option<f64>,
    /// New editing flag, if being updated.
    pub editing: Option<bool>,
    /// New pinned flag, if being updated.
    pub pinned: Option<bool>,
}
