use chrono::{DateTime, Utc};
use error_stack::Report;
use thiserror::Error;
use uuid::Uuid;

use super::content::{self, ContentRejection};
use super::guard::{self, Decision};
use crate::models::Post;
use crate::store::{NewPost, StoreError, StoreResult, WallStore};

/// Hard cap on the board snapshot returned to clients.
pub const LIST_LIMIT: i64 = 200;

#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Content(#[from] ContentRejection),
    #[error("a color is required")]
    MissingColor,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("duplicate content")]
    Duplicate,
    #[error("failed to insert the note")]
    Store(Report<StoreError>),
}

/// Newest-first snapshot of the wall plus the exact total, capped at
/// [`LIST_LIMIT`].
#[tracing::instrument(skip_all, name = "wall.list_posts")]
pub async fn list_recent(store: &dyn WallStore) -> StoreResult<(Vec<Post>, u64)> {
    store.list_recent(LIST_LIMIT).await
}

/// Single-note lookup; `None` when no such note exists.
#[tracing::instrument(skip(store), name = "wall.get_post")]
pub async fn by_id(store: &dyn WallStore, id: Uuid) -> StoreResult<Option<Post>> {
    store.post_by_id(id).await
}

#[derive(Debug)]
pub struct CreatePost {
    pub text: String,
    pub color: String,
    pub signature: Option<String>,
    pub is_anonymous: bool,
}

impl CreatePost {
    /// Validates, consults the abuse guard and inserts the note.
    ///
    /// Content checks run strictly before the guard: a rejected draft never
    /// hits the store and never counts against anyone's rate limit.
    #[tracing::instrument(skip_all, name = "wall.create_post")]
    pub async fn perform(
        self,
        store: &dyn WallStore,
        ip_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Post, CreateError> {
        let text = self.text.trim().to_owned();
        content::validate_text(&text)?;

        let color = self.color.trim();
        if color.is_empty() {
            return Err(CreateError::MissingColor);
        }

        match guard::check_can_post(store, ip_hash, &text, now).await {
            Decision::Allowed => {}
            Decision::RateLimited => return Err(CreateError::RateLimited),
            Decision::DuplicateContent => return Err(CreateError::Duplicate),
        }

        let signature = if self.is_anonymous {
            None
        } else {
            self.signature
                .as_deref()
                .map(|s| {
                    let s = s.trim();
                    s.strip_prefix('@').unwrap_or(s).trim()
                })
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        store
            .insert_post(NewPost {
                text,
                color: color.to_owned(),
                signature,
                is_anonymous: self.is_anonymous,
                created_at: now,
                position_hint: now.timestamp_millis(),
                ip_hash: ip_hash.to_owned(),
            })
            .await
            .map_err(CreateError::Store)
    }
}
