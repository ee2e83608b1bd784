use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::{Connection, ErrorExt, Result};

/// One fingerprint having hearted one post. The (post_id, ip_hash) pair is
/// the idempotency key; rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heart {
    pub id: Uuid,
    pub post_id: Uuid,
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Heart {
    #[tracing::instrument(skip(conn, ip_hash), fields(ip_hash = "<hidden>"))]
    pub async fn find(conn: &mut Connection, post_id: Uuid, ip_hash: &str) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "hearts" WHERE post_id = $1 AND ip_hash = $2"#)
            .bind(post_id)
            .bind(ip_hash)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn, ip_hash), fields(ip_hash = "<hidden>"))]
    pub async fn insert(conn: &mut Connection, post_id: Uuid, ip_hash: &str) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO "hearts" (post_id, ip_hash) VALUES ($1, $2) RETURNING *"#,
        )
        .bind(post_id)
        .bind(ip_hash)
        .fetch_one(conn)
        .await
        .into_db_error()
    }
}
