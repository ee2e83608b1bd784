use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::{Connection, ErrorExt, Result};

/// A single note on the wall.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub color: String,
    pub signature: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub hearts: i64,
    pub shares: i64,
    /// Monotonic insertion-order key, independent of `created_at` clock
    /// collisions.
    pub position: i64,
    /// Abuse-check key only, never serialized into responses.
    #[serde(skip_serializing, default)]
    pub ip_hash: String,
}

impl Post {
    #[tracing::instrument(skip(conn))]
    pub async fn list_recent(conn: &mut Connection, limit: i64) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"SELECT * FROM "posts"
            ORDER BY created_at DESC, "position" DESC
            LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn count_all(conn: &mut Connection) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(r#"SELECT count(*) FROM "posts""#)
            .fetch_one(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn by_id(conn: &mut Connection, id: Uuid) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "posts" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn, ip_hash), fields(ip_hash = "<hidden>"))]
    pub async fn count_by_hash_since(
        conn: &mut Connection,
        ip_hash: &str,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT count(*) FROM "posts" WHERE ip_hash = $1 AND created_at >= $2"#,
        )
        .bind(ip_hash)
        .bind(since)
        .fetch_one(conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip(conn, ip_hash, text), fields(ip_hash = "<hidden>"))]
    pub async fn duplicate_exists(
        conn: &mut Connection,
        ip_hash: &str,
        text: &str,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (
                SELECT 1 FROM "posts"
                WHERE ip_hash = $1 AND text = $2 AND created_at >= $3
            )"#,
        )
        .bind(ip_hash)
        .bind(text)
        .bind(since)
        .fetch_one(conn)
        .await
        .into_db_error()
    }

    /// Atomic counter bump; the primary path for heart/share counting.
    /// Returns whether a row was actually touched.
    #[tracing::instrument(skip(conn))]
    pub async fn increment_hearts(conn: &mut Connection, id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"UPDATE "posts" SET hearts = hearts + 1 WHERE id = $1"#)
            .bind(id)
            .execute(conn)
            .await
            .into_db_error()?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(conn))]
    pub async fn increment_shares(conn: &mut Connection, id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"UPDATE "posts" SET shares = shares + 1 WHERE id = $1"#)
            .bind(id)
            .execute(conn)
            .await
            .into_db_error()?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(conn))]
    pub async fn hearts_of(conn: &mut Connection, id: Uuid) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>(r#"SELECT hearts FROM "posts" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn set_hearts(conn: &mut Connection, id: Uuid, value: i64) -> Result<bool> {
        let result = sqlx::query(r#"UPDATE "posts" SET hearts = $2 WHERE id = $1"#)
            .bind(id)
            .bind(value)
            .execute(conn)
            .await
            .into_db_error()?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(conn))]
    pub async fn shares_of(conn: &mut Connection, id: Uuid) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>(r#"SELECT shares FROM "posts" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn set_shares(conn: &mut Connection, id: Uuid, value: i64) -> Result<bool> {
        let result = sqlx::query(r#"UPDATE "posts" SET shares = $2 WHERE id = $1"#)
            .bind(id)
            .bind(value)
            .execute(conn)
            .await
            .into_db_error()?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug)]
pub struct InsertPost<'a> {
    pub text: &'a str,
    pub color: &'a str,
    pub signature: Option<&'a str>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    /// Millisecond timestamp suggested by the caller. The insert raises it
    /// above every existing position so insertion order stays strict even
    /// when two notes land in the same millisecond.
    pub position_hint: i64,
    pub ip_hash: &'a str,
}

impl InsertPost<'_> {
    #[tracing::instrument(skip_all)]
    pub async fn insert(self, conn: &mut Connection) -> Result<Post> {
        sqlx::query_as::<_, Post>(
            r#"INSERT INTO "posts"
                (text, color, signature, is_anonymous, created_at, hearts, shares, "position", ip_hash)
            VALUES
                ($1, $2, $3, $4, $5, 0, 0,
                 GREATEST($6, (SELECT COALESCE(MAX("position"), 0) + 1 FROM "posts")),
                 $7)
            RETURNING *"#,
        )
        .bind(self.text)
        .bind(self.color)
        .bind(self.signature)
        .bind(self.is_anonymous)
        .bind(self.created_at)
        .bind(self.position_hint)
        .bind(self.ip_hash)
        .fetch_one(conn)
        .await
        .into_db_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_never_carry_the_fingerprint() {
        let post = Post {
            id: Uuid::new_v4(),
            text: "this market is wild today!!".into(),
            color: "#fff3a3".into(),
            signature: None,
            is_anonymous: true,
            created_at: Utc::now(),
            hearts: 0,
            shares: 0,
            position: 1,
            ip_hash: "deadbeef".into(),
        };

        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("ipHash").is_none());
        assert!(json.get("ip_hash").is_none());
        assert_eq!(json["isAnonymous"], serde_json::json!(true));
        assert_eq!(json["hearts"], serde_json::json!(0));
    }
}
