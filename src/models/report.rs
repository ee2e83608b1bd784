use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::{Connection, ErrorExt, Result};

/// One fingerprint flagging one post. Append-only; repeated reports from
/// the same origin are accepted and logged.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReport {
    pub id: Uuid,
    pub post_id: Uuid,
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

impl PostReport {
    #[tracing::instrument(skip(conn, ip_hash), fields(ip_hash = "<hidden>"))]
    pub async fn insert(conn: &mut Connection, post_id: Uuid, ip_hash: &str) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO "reports" (post_id, ip_hash) VALUES ($1, $2) RETURNING *"#,
        )
        .bind(post_id)
        .bind(ip_hash)
        .fetch_one(conn)
        .await
        .into_db_error()
    }
}
