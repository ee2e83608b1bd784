use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Heart, Post, PostReport};

mod memory;
mod postgres;

pub use memory::{Fault, MemoryStore};
pub use postgres::PgStore;

#[derive(Debug, Error)]
#[error("wall store operation failed")]
pub struct StoreError;

pub type StoreResult<T> = error_stack::Result<T, StoreError>;

/// A validated draft, stamped by the service layer before it reaches
/// the store.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub color: String,
    pub signature: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    /// Insert-moment timestamp in milliseconds. The store raises it above
    /// every existing position before it lands in a row.
    pub position_hint: i64,
    pub ip_hash: String,
}

/// The seam between the wall's domain logic and the datastore.
///
/// Handlers and services only ever see this trait; [`PgStore`] backs it in
/// production and [`MemoryStore`] in tests, so every policy decision can be
/// exercised deterministically without a running database.
#[async_trait]
pub trait WallStore: Send + Sync {
    /// Newest-first snapshot capped at `limit`, plus the exact total.
    async fn list_recent(&self, limit: i64) -> StoreResult<(Vec<Post>, u64)>;

    async fn post_by_id(&self, id: Uuid) -> StoreResult<Option<Post>>;

    async fn insert_post(&self, new: NewPost) -> StoreResult<Post>;

    /// Posts created by `ip_hash` at or after `since`.
    async fn count_posts_since(&self, ip_hash: &str, since: DateTime<Utc>) -> StoreResult<u64>;

    /// Whether `ip_hash` already posted exactly `text` at or after `since`.
    async fn has_duplicate_since(
        &self,
        ip_hash: &str,
        text: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<bool>;

    async fn find_heart(&self, post_id: Uuid, ip_hash: &str) -> StoreResult<Option<Heart>>;

    async fn insert_heart(&self, post_id: Uuid, ip_hash: &str) -> StoreResult<Heart>;

    /// Atomic `hearts + 1`; returns whether a row was touched.
    async fn increment_hearts(&self, post_id: Uuid) -> StoreResult<bool>;

    /// Atomic `shares + 1`; returns whether a row was touched.
    async fn increment_shares(&self, post_id: Uuid) -> StoreResult<bool>;

    async fn hearts_of(&self, post_id: Uuid) -> StoreResult<Option<i64>>;

    async fn set_hearts(&self, post_id: Uuid, value: i64) -> StoreResult<bool>;

    async fn shares_of(&self, post_id: Uuid) -> StoreResult<Option<i64>>;

    async fn set_shares(&self, post_id: Uuid, value: i64) -> StoreResult<bool>;

    async fn insert_report(&self, post_id: Uuid, ip_hash: &str) -> StoreResult<PostReport>;
}
