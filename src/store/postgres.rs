use async_trait::async_trait;
use chrono::{DateTime, Utc};
use error_stack::ResultExt;
use uuid::Uuid;

use super::{NewPost, StoreError, StoreResult, WallStore};
use crate::database::{self, PoolConnection};
use crate::models::{Heart, InsertPost, Post, PostReport};

/// [`WallStore`] backed by the Postgres pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: database::Pool,
}

impl PgStore {
    pub fn new(pool: database::Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> StoreResult<PoolConnection> {
        self.pool.get().await.change_context(StoreError)
    }
}

#[async_trait]
impl WallStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn list_recent(&self, limit: i64) -> StoreResult<(Vec<Post>, u64)> {
        let mut conn = self.conn().await?;
        let items = Post::list_recent(&mut conn, limit)
            .await
            .change_context(StoreError)?;
        let total = Post::count_all(&mut conn)
            .await
            .change_context(StoreError)?;

        Ok((items, total.max(0) as u64))
    }

    #[tracing::instrument(skip(self))]
    async fn post_by_id(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let mut conn = self.conn().await?;
        Post::by_id(&mut conn, id).await.change_context(StoreError)
    }

    #[tracing::instrument(skip_all)]
    async fn insert_post(&self, new: NewPost) -> StoreResult<Post> {
        let mut conn = self.conn().await?;
        InsertPost {
            text: &new.text,
            color: &new.color,
            signature: new.signature.as_deref(),
            is_anonymous: new.is_anonymous,
            created_at: new.created_at,
            position_hint: new.position_hint,
            ip_hash: &new.ip_hash,
        }
        .insert(&mut conn)
        .await
        .change_context(StoreError)
    }

    #[tracing::instrument(skip(self, ip_hash))]
    async fn count_posts_since(&self, ip_hash: &str, since: DateTime<Utc>) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        let count = Post::count_by_hash_since(&mut conn, ip_hash, since)
            .await
            .change_context(StoreError)?;

        Ok(count.max(0) as u64)
    }

    #[tracing::instrument(skip(self, ip_hash, text))]
    async fn has_duplicate_since(
        &self,
        ip_hash: &str,
        text: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        Post::duplicate_exists(&mut conn, ip_hash, text, since)
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(skip(self, ip_hash))]
    async fn find_heart(&self, post_id: Uuid, ip_hash: &str) -> StoreResult<Option<Heart>> {
        let mut conn = self.conn().await?;
        Heart::find(&mut conn, post_id, ip_hash)
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(skip(self, ip_hash))]
    async fn insert_heart(&self, post_id: Uuid, ip_hash: &str) -> StoreResult<Heart> {
        let mut conn = self.conn().await?;
        Heart::insert(&mut conn, post_id, ip_hash)
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(skip(self))]
    async fn increment_hearts(&self, post_id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        Post::increment_hearts(&mut conn, post_id)
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(skip(self))]
    async fn increment_shares(&self, post_id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        Post::increment_shares(&mut conn, post_id)
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(skip(self))]
    async fn hearts_of(&self, post_id: Uuid) -> StoreResult<Option<i64>> {
        let mut conn = self.conn().await?;
        Post::hearts_of(&mut conn, post_id)
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(skip(self))]
    async fn set_hearts(&self, post_id: Uuid, value: i64) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        Post::set_hearts(&mut conn, post_id, value)
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(skip(self))]
    async fn shares_of(&self, post_id: Uuid) -> StoreResult<Option<i64>> {
        let mut conn = self.conn().await?;
        Post::shares_of(&mut conn, post_id)
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(skip(self))]
    async fn set_shares(&self, post_id: Uuid, value: i64) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        Post::set_shares(&mut conn, post_id, value)
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(skip(self, ip_hash))]
    async fn insert_report(&self, post_id: Uuid, ip_hash: &str) -> StoreResult<PostReport> {
        let mut conn = self.conn().await?;
        PostReport::insert(&mut conn, post_id, ip_hash)
            .await
            .change_context(StoreError)
    }
}
