//! Orbit integrator: closed-form circular motion for unpinned posts.
//!
//! Each tick advances every unpinned post's phase by its own speed and
//! recomputes its position on the circle around the fixed canvas center.
//! This is deliberately not a force integrator: the closed form is
//! deterministic and boundary-free, needs no collision or gravity
//! resolution, and still mirrors positions into a parallel body table so a
//! rigid-body engine can be attached later without touching the post model.
//!
//! The integrator writes positions and angles back into the registry; it
//! never reads or mutates `editing`, `title`, or `content`.

#[cfg(test)]
#[path = "orbit_test.rs"]
mod orbit_test;

use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::post::{Point, PostId};
use crate::registry::PostStore;

/// Source of default orbit angles. Seedable so tests fix outcomes.
pub struct AngleSource {
    rng: StdRng,
}

impl AngleSource {
    /// Deterministic source for a fixed seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Source seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    /// Next default angle, uniform in `[0, 2π)`.
    pub fn next_angle(&mut self) -> f64 {
        self.rng.random_range(0.0..TAU)
    }
}

/// Position mirror of a post inside the (future) rigid-body engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitBody {
    pub x: f64,
    pub y: f64,
}

/// Parallel table of bodies keyed by post id. Posts hold no body handle;
/// the tables stay in step through the engine.
pub struct BodyTable {
    bodies: HashMap<PostId, OrbitBody>,
}

impl BodyTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self { bodies: HashMap::new() }
    }

    /// Create or replace the body for a post.
    pub fn insert(&mut self, id: PostId, x: f64, y: f64) {
        self.bodies.insert(id, OrbitBody { x, y });
    }

    /// Remove a post's body, returning it if it was present.
    pub fn remove(&mut self, id: &PostId) -> Option<OrbitBody> {
        self.bodies.remove(id)
    }

    /// Return a post's body, if it has one.
    #[must_use]
    pub fn get(&self, id: &PostId) -> Option<&OrbitBody> {
        self.bodies.get(id)
    }

    /// Mirror a new position into an existing body. Posts without a body
    /// (e.g. rehydrated from a snapshot) are left alone.
    pub fn mirror(&mut self, id: &PostId, x: f64, y: f64) {
        if let Some(body) = self.bodies.get_mut(id) {
            body.x = x;
            body.y = y;
        }
    }

    /// Drop all bodies.
    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    /// Number of bodies in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if the table holds no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl Default for BodyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance every unpinned post by one tick.
///
/// `angle ← (angle + speed) mod 2π`, then
/// `position ← center + radius · (cos angle, sin angle)`.
pub fn step(registry: &mut PostStore, bodies: &mut BodyTable, center: Point) {
    for post in registry.posts_mut() {
        if post.pinned {
            continue;
        }
        post.orbit_angle = (post.orbit_angle + post.orbit_speed).rem_euclid(TAU);
        post.x = center.x + post.orbit_radius * post.orbit_angle.cos();
        post.y = center.y + post.orbit_radius * post.orbit_angle.sin();
        bodies.mirror(&post.id, post.x, post.y);
    }
}
