//! Snapshot history: immutable, versioned copies of canvas state.
//!
//! A capture deep-copies the durable card state of every post — never
//! physics-engine state, never transient interaction flags — so mutating
//! the live registry afterwards cannot alter what was captured. Versions
//! are allocated `max(existing) + 1` starting at 1.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};

use crate::log::now_ms;
use crate::persist::SnapshotRecord;
use crate::registry::PostStore;

/// Durable card state of one post inside a snapshot. Field names follow
/// the persistence service's post records so `snapshot_data` payloads
/// round-trip with the original store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPost {
    /// Server-canonical id at capture time, if the post was synced.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "position_x", default)]
    pub x: f64,
    #[serde(rename = "position_y", default)]
    pub y: f64,
}

/// One immutable capture of canvas state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Strictly increasing, starting at 1.
    pub version: u64,
    /// Unix milliseconds at capture time.
    pub ts: i64,
    /// Captured posts in registry order.
    pub posts: Vec<SnapshotPost>,
}

impl Snapshot {
    /// Wire record for persisting this snapshot.
    #[must_use]
    pub fn to_record(&self) -> SnapshotRecord {
        SnapshotRecord {
            id: None,
            version: self.version,
            timestamp: None,
            snapshot_data: serde_json::to_value(&self.posts).unwrap_or_else(|_| serde_json::json!([])),
        }
    }
}

/// Ordered local history of captures.
pub struct SnapshotHistory {
    snapshots: Vec<Snapshot>,
}

impl SnapshotHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    /// Capture the registry's current durable state as the next version.
    pub fn capture(&mut self, registry: &PostStore) -> Snapshot {
        let posts = registry
            .ordered_posts()
            .into_iter()
            .map(|post| SnapshotPost {
                remote_id: post.remote_id,
                title: post.title.clone(),
                content: post.content.clone(),
                x: post.x,
                y: post.y,
            })
            .collect();
        let snapshot = Snapshot { version: self.next_version(), ts: now_ms(), posts };
        self.snapshots.push(snapshot.clone());
        snapshot
    }

    /// The version the next capture will receive.
    #[must_use]
    pub fn next_version(&self) -> u64 {
        self.snapshots.iter().map(|s| s.version).max().unwrap_or(0) + 1
    }

    /// Look up a captured snapshot by version.
    #[must_use]
    pub fn get(&self, version: u64) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.version == version)
    }

    /// All captures, oldest first.
    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Number of captures taken.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns `true` if nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new()
    }
}
