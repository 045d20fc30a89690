/*
 * Responsibility
 * - posts の CRUD
 * - "authorEmail" が所有者。insert 時に決まり、以後更新しない
 * - comment は post と一緒に消える (FK ON DELETE CASCADE)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PostRow {
    #[sqlx(rename = "postId")]
    pub post_id: i64,

    pub title: String,
    pub content: String,

    #[sqlx(rename = "authorEmail")]
    pub author_email: String,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[sqlx(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<PostRow>>;

    async fn create(&self, title: &str, content: &str, author_email: &str) -> RepoResult<PostRow>;

    async fn get(&self, post_id: i64) -> RepoResult<Option<PostRow>>;

    /// `None` fields are left untouched.
    async fn update(
        &self,
        post_id: i64,
        title: Option<&str>,
        content: Option<&str>,
    ) -> RepoResult<Option<PostRow>>;

    async fn delete(&self, post_id: i64) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgPostRepo {
    pool: PgPool,
}

impl PgPostRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostRepo {
    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<PostRow>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                "postId", title, content, "authorEmail", "createdAt", "updatedAt"
            FROM posts
            ORDER BY "postId" DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn create(&self, title: &str, content: &str, author_email: &str) -> RepoResult<PostRow> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (title, content, "authorEmail")
            VALUES ($1, $2, $3)
            RETURNING
                "postId", title, content, "authorEmail", "createdAt", "updatedAt"
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(author_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get(&self, post_id: i64) -> RepoResult<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                "postId", title, content, "authorEmail", "createdAt", "updatedAt"
            FROM posts
            WHERE "postId" = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(
        &self,
        post_id: i64,
        title: Option<&str>,
        content: Option<&str>,
    ) -> RepoResult<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                "updatedAt" = now()
            WHERE "postId" = $1
            RETURNING
                "postId", title, content, "authorEmail", "createdAt", "updatedAt"
            "#,
        )
        .bind(post_id)
        .bind(title)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, post_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE "postId" = $1
            "#,
        )
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
