//! Persistence service wire layer.
//!
//! Thin HTTP wrapper over the remote post/snapshot store. The engine and
//! the tests depend on the [`PersistenceApi`] trait; [`HttpPersistence`] is
//! the production implementation. List endpoints return the raw JSON body
//! so the caller can reject a non-sequence payload defensively instead of
//! failing the whole decode.
//!
//! ERROR HANDLING
//! ==============
//! Non-success statuses and transport errors become [`PersistError`]s for
//! the sync layer to log. Nothing here retries; compensation policy lives
//! with the engine.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::post::Post;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// User recorded on post records when no account system is in play.
const DEFAULT_USER_ID: &str = "guest";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// A post record as stored by the persistence service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    /// Server-assigned identity; absent on create requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub position_x: f64,
    pub position_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    /// Orbit speed in radians per tick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(rename = "orbitRadius", default, skip_serializing_if = "Option::is_none")]
    pub orbit_radius: Option<f64>,
    /// Orbit phase at save time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Card dimensions; opaque to the engine, passed through for the
    /// rendering surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl PostRecord {
    /// Full record for a create request: everything the service stores,
    /// physics parameters included, sans `id`.
    #[must_use]
    pub fn from_post(post: &Post) -> Self {
        Self {
            id: None,
            title: post.title.clone(),
            content: post.content.clone(),
            position_x: post.x,
            position_y: post.y,
            mass: Some(post.mass),
            velocity: Some(post.orbit_speed),
            orbit_radius: Some(post.orbit_radius),
            angle: Some(post.orbit_angle),
            user_id: Some(DEFAULT_USER_ID.to_owned()),
            dimensions: None,
            created_at: None,
        }
    }

    /// Record for an update request: transient and physics-engine fields
    /// stripped, only durable card state travels.
    #[must_use]
    pub fn update_body(post: &Post) -> Self {
        Self {
            id: None,
            title: post.title.clone(),
            content: post.content.clone(),
            position_x: post.x,
            position_y: post.y,
            mass: None,
            velocity: None,
            orbit_radius: None,
            angle: None,
            user_id: Some(DEFAULT_USER_ID.to_owned()),
            dimensions: None,
            created_at: None,
        }
    }
}

/// A snapshot record as stored by the persistence service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub snapshot_data: serde_json::Value,
}

// =============================================================================
// API TRAIT
// =============================================================================

/// Seam between the engine and the remote store. Production code uses
/// [`HttpPersistence`]; tests substitute an in-memory mock.
#[async_trait::async_trait]
pub trait PersistenceApi: Send + Sync {
    /// Fetch all post records. Returns the raw JSON body (expected: array).
    async fn list_posts(&self) -> Result<serde_json::Value, PersistError>;

    /// Create a post; the response carries the assigned id.
    async fn create_post(&self, record: &PostRecord) -> Result<PostRecord, PersistError>;

    /// Replace the stored record for `id`.
    async fn update_post(&self, id: i64, record: &PostRecord) -> Result<PostRecord, PersistError>;

    /// Delete the stored record for `id`.
    async fn delete_post(&self, id: i64) -> Result<(), PersistError>;

    /// Fetch all snapshot records. Returns the raw JSON body (expected: array).
    async fn list_snapshots(&self) -> Result<serde_json::Value, PersistError>;

    /// Store a snapshot.
    async fn create_snapshot(&self, record: &SnapshotRecord) -> Result<(), PersistError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// Production persistence client over JSON/HTTP.
pub struct HttpPersistence {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPersistence {
    /// Build a client for the given service origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, PersistError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Check the status, then decode the body.
async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, PersistError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(PersistError::Status { status: status.as_u16(), body: text });
    }
    Ok(serde_json::from_str(&text)?)
}

/// Check the status, discarding the body.
async fn read_ok(response: reqwest::Response) -> Result<(), PersistError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await?;
        return Err(PersistError::Status { status: status.as_u16(), body: text });
    }
    Ok(())
}

#[async_trait::async_trait]
impl PersistenceApi for HttpPersistence {
    async fn list_posts(&self) -> Result<serde_json::Value, PersistError> {
        let response = self.http.get(self.url("/posts/")).send().await?;
        read_json(response).await
    }

    async fn create_post(&self, record: &PostRecord) -> Result<PostRecord, PersistError> {
        let response = self.http.post(self.url("/posts/")).json(record).send().await?;
        read_json(response).await
    }

    async fn update_post(&self, id: i64, record: &PostRecord) -> Result<PostRecord, PersistError> {
        let response = self
            .http
            .put(self.url(&format!("/posts/{id}")))
            .json(record)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), PersistError> {
        let response = self.http.delete(self.url(&format!("/posts/{id}"))).send().await?;
        read_ok(response).await
    }

    async fn list_snapshots(&self) -> Result<serde_json::Value, PersistError> {
        let response = self.http.get(self.url("/snapshots/")).send().await?;
        read_json(response).await
    }

    async fn create_snapshot(&self, record: &SnapshotRecord) -> Result<(), PersistError> {
        let response = self.http.post(self.url("/snapshots/")).json(record).send().await?;
        read_ok(response).await
    }
}

// =============================================================================
// TEST MOCK
// =============================================================================
