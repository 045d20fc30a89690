//! `DATABASE_URL` 未設定時に使うプロセス内ストア (ローカル実行、テスト)。
//!
//! Postgres 版と同じ契約: email は一意、post 一覧は新しい順、
//! post を消すと comment も消える、author の存在は確認しない。
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::comment_repo::{CommentRow, CommentStore};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::post_repo::{PostRow, PostStore};
use crate::repos::user_repo::{CredentialStore, Identity};

#[derive(Debug, Default)]
pub struct InMemoryUserRepo {
    users: RwLock<HashMap<String, Identity>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Identity>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        Ok(self.users.read().await.contains_key(email))
    }

    async fn save(&self, identity: &Identity) -> RepoResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&identity.email) {
            return Err(RepoError::Conflict);
        }
        users.insert(identity.email.clone(), identity.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct BoardTables {
    next_post_id: i64,
    next_comment_id: i64,
    posts: BTreeMap<i64, PostRow>,
    comments: BTreeMap<i64, CommentRow>,
}

/// Posts and comments behind one lock so a post delete cascades atomically.
#[derive(Debug, Default)]
pub struct InMemoryBoardRepo {
    tables: RwLock<BoardTables>,
}

impl InMemoryBoardRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryBoardRepo {
    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<PostRow>> {
        let tables = self.tables.read().await;
        let rows = tables
            .posts
            .values()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn create(&self, title: &str, content: &str, author_email: &str) -> RepoResult<PostRow> {
        let mut tables = self.tables.write().await;
        tables.next_post_id += 1;
        let now = Utc::now();
        let row = PostRow {
            post_id: tables.next_post_id,
            title: title.to_string(),
            content: content.to_string(),
            author_email: author_email.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(row.post_id, row.clone());
        Ok(row)
    }

    async fn get(&self, post_id: i64) -> RepoResult<Option<PostRow>> {
        Ok(self.tables.read().await.posts.get(&post_id).cloned())
    }

    async fn update(
        &self,
        post_id: i64,
        title: Option<&str>,
        content: Option<&str>,
    ) -> RepoResult<Option<PostRow>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            row.title = title.to_string();
        }
        if let Some(content) = content {
            row.content = content.to_string();
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, post_id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.posts.remove(&post_id).is_some();
        if removed {
            tables.comments.retain(|_, c| c.post_id != post_id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CommentStore for InMemoryBoardRepo {
    async fn list_for_post(&self, post_id: i64) -> RepoResult<Vec<CommentRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        post_id: i64,
        content: &str,
        author_email: &str,
    ) -> RepoResult<CommentRow> {
        let mut tables = self.tables.write().await;
        // comments."postId" の FK に合わせる
        if !tables.posts.contains_key(&post_id) {
            return Err(RepoError::Conflict);
        }
        tables.next_comment_id += 1;
        let row = CommentRow {
            comment_id: tables.next_comment_id,
            post_id,
            content: content.to_string(),
            author_email: author_email.to_string(),
            created_at: Utc::now(),
        };
        tables.comments.insert(row.comment_id, row.clone());
        Ok(row)
    }

    async fn get(&self, comment_id: i64) -> RepoResult<Option<CommentRow>> {
        Ok(self.tables.read().await.comments.get(&comment_id).cloned())
    }

    async fn delete(&self, comment_id: i64) -> RepoResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .comments
            .remove(&comment_id)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::Role;

    fn identity(email: &str) -> Identity {
        Identity {
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = InMemoryUserRepo::new();
        assert!(!repo.exists_by_email("a@x.com").await.unwrap());

        repo.save(&identity("a@x.com")).await.unwrap();
        assert!(repo.exists_by_email("a@x.com").await.unwrap());

        let err = repo.save(&identity("a@x.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict));
    }

    #[tokio::test]
    async fn posts_are_listed_newest_first() {
        let repo = InMemoryBoardRepo::new();
        for n in 1..=3 {
            PostStore::create(&repo, &format!("t{n}"), "c", "a@x.com")
                .await
                .unwrap();
        }

        let titles: Vec<_> = PostStore::list(&repo, 2, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["t3", "t2"]);
    }

    #[tokio::test]
    async fn deleting_a_post_removes_its_comments() {
        let repo = InMemoryBoardRepo::new();
        let post = PostStore::create(&repo, "t", "c", "a@x.com").await.unwrap();
        let comment = CommentStore::create(&repo, post.post_id, "hi", "b@x.com")
            .await
            .unwrap();

        assert!(PostStore::delete(&repo, post.post_id).await.unwrap());
        assert!(
            CommentStore::get(&repo, comment.comment_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let repo = InMemoryBoardRepo::new();
        let post = PostStore::create(&repo, "t", "c", "a@x.com").await.unwrap();

        let updated = PostStore::update(&repo, post.post_id, None, Some("c2"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "t");
        assert_eq!(updated.content, "c2");
        assert_eq!(updated.author_email, "a@x.com");
    }
}
