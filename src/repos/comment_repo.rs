/*
 * Responsibility
 * - comments の CRUD (update なし。作成と削除のみ)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CommentRow {
    #[sqlx(rename = "commentId")]
    pub comment_id: i64,

    #[sqlx(rename = "postId")]
    pub post_id: i64,

    pub content: String,

    #[sqlx(rename = "authorEmail")]
    pub author_email: String,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Oldest first.
    async fn list_for_post(&self, post_id: i64) -> RepoResult<Vec<CommentRow>>;

    async fn create(
        &self,
        post_id: i64,
        content: &str,
        author_email: &str,
    ) -> RepoResult<CommentRow>;

    async fn get(&self, comment_id: i64) -> RepoResult<Option<CommentRow>>;

    async fn delete(&self, comment_id: i64) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgCommentRepo {
    pool: PgPool,
}

impl PgCommentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentRepo {
    async fn list_for_post(&self, post_id: i64) -> RepoResult<Vec<CommentRow>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT "commentId", "postId", content, "authorEmail", "createdAt"
            FROM comments
            WHERE "postId" = $1
            ORDER BY "commentId" ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn create(
        &self,
        post_id: i64,
        content: &str,
        author_email: &str,
    ) -> RepoResult<CommentRow> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments ("postId", content, "authorEmail")
            VALUES ($1, $2, $3)
            RETURNING "commentId", "postId", content, "authorEmail", "createdAt"
            "#,
        )
        .bind(post_id)
        .bind(content)
        .bind(author_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get(&self, comment_id: i64) -> RepoResult<Option<CommentRow>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT "commentId", "postId", content, "authorEmail", "createdAt"
            FROM comments
            WHERE "commentId" = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, comment_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE "commentId" = $1
            "#,
        )
        .bind(comment_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
