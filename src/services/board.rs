/*
 * Responsibility
 * - posts / comments のユースケース
 * - update / delete は必ず認可判定を通してから store に触る
 * - 存在確認 (404) → 権限 (403) の順。呼び出し元の認証は handler の手前で済んでいる
 */
use std::sync::Arc;

use tracing::info;

use crate::error::AppError;
use crate::repos::{CommentRow, CommentStore, PostRow, PostStore, RepoError};
use crate::services::auth::{Action, CallerContext, access};

const LIST_LIMIT: i64 = 50;

#[derive(Debug, Clone)]
pub struct PostWithComments {
    pub post: PostRow,
    pub comments: Vec<CommentRow>,
}

#[derive(Clone)]
pub struct BoardService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
}

impl std::fmt::Debug for BoardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardService").finish_non_exhaustive()
    }
}

impl BoardService {
    pub fn new(posts: Arc<dyn PostStore>, comments: Arc<dyn CommentStore>) -> Self {
        Self { posts, comments }
    }

    pub async fn list_posts(&self, offset: i64) -> Result<Vec<PostRow>, AppError> {
        Ok(self.posts.list(LIST_LIMIT, offset.max(0)).await?)
    }

    pub async fn get_post(&self, post_id: i64) -> Result<PostWithComments, AppError> {
        let post = self.find_post(post_id).await?;
        let comments = self.comments.list_for_post(post_id).await?;
        Ok(PostWithComments { post, comments })
    }

    pub async fn create_post(
        &self,
        caller: &CallerContext,
        title: &str,
        content: &str,
    ) -> Result<PostRow, AppError> {
        let row = self.posts.create(title, content, &caller.email).await?;
        info!(post_id = row.post_id, author = %caller.email, "post created");
        Ok(row)
    }

    pub async fn update_post(
        &self,
        caller: &CallerContext,
        post_id: i64,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<PostRow, AppError> {
        let post = self.find_post(post_id).await?;
        access::authorize(Some(caller), &post.author_email, Action::Update)?;

        self.posts
            .update(post_id, title, content)
            .await?
            .ok_or(AppError::not_found("post"))
    }

    pub async fn delete_post(&self, caller: &CallerContext, post_id: i64) -> Result<(), AppError> {
        let post = self.find_post(post_id).await?;
        access::authorize(Some(caller), &post.author_email, Action::Delete)?;

        if !self.posts.delete(post_id).await? {
            return Err(AppError::not_found("post"));
        }
        info!(post_id, by = %caller.email, "post deleted");
        Ok(())
    }

    pub async fn create_comment(
        &self,
        caller: &CallerContext,
        post_id: i64,
        content: &str,
    ) -> Result<CommentRow, AppError> {
        self.find_post(post_id).await?;
        // find_post と insert の間に post が消えた場合 (FK 違反) も 404 に揃える
        let row = match self.comments.create(post_id, content, &caller.email).await {
            Ok(row) => row,
            Err(RepoError::Conflict) => return Err(AppError::not_found("post")),
            Err(e) => return Err(e.into()),
        };
        info!(post_id, comment_id = row.comment_id, author = %caller.email, "comment created");
        Ok(row)
    }

    pub async fn delete_comment(
        &self,
        caller: &CallerContext,
        comment_id: i64,
    ) -> Result<(), AppError> {
        let comment = self
            .comments
            .get(comment_id)
            .await?
            .ok_or(AppError::not_found("comment"))?;
        access::authorize(Some(caller), &comment.author_email, Action::Delete)?;

        if !self.comments.delete(comment_id).await? {
            return Err(AppError::not_found("comment"));
        }
        info!(comment_id, by = %caller.email, "comment deleted");
        Ok(())
    }

    async fn find_post(&self, post_id: i64) -> Result<PostRow, AppError> {
        self.posts
            .get(post_id)
            .await?
            .ok_or(AppError::not_found("post"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::InMemoryBoardRepo;
    use crate::services::auth::Role;

    fn board() -> BoardService {
        let repo = Arc::new(InMemoryBoardRepo::new());
        BoardService::new(repo.clone(), repo)
    }

    fn alice() -> CallerContext {
        CallerContext::new("a@x.com", Role::User)
    }

    fn bob() -> CallerContext {
        CallerContext::new("b@x.com", Role::User)
    }

    fn admin() -> CallerContext {
        CallerContext::new("root@x.com", Role::Admin)
    }

    #[tokio::test]
    async fn owner_is_recorded_from_the_caller() {
        let board = board();
        let post = board.create_post(&alice(), "t", "c").await.unwrap();
        assert_eq!(post.author_email, "a@x.com");
    }

    #[tokio::test]
    async fn only_owner_or_admin_may_update_a_post() {
        let board = board();
        let post = board.create_post(&alice(), "t", "c").await.unwrap();

        let err = board
            .update_post(&bob(), post.post_id, Some("hijack"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        let by_owner = board
            .update_post(&alice(), post.post_id, Some("t2"), None)
            .await
            .unwrap();
        assert_eq!(by_owner.title, "t2");

        let by_admin = board
            .update_post(&admin(), post.post_id, None, Some("moderated"))
            .await
            .unwrap();
        assert_eq!(by_admin.content, "moderated");
        assert_eq!(by_admin.author_email, "a@x.com");
    }

    #[tokio::test]
    async fn post_and_comment_deletes_use_the_same_rule() {
        let board = board();
        let post = board.create_post(&alice(), "t", "c").await.unwrap();
        let comment = board
            .create_comment(&bob(), post.post_id, "hi")
            .await
            .unwrap();

        // a plain owner may delete their own comment and their own post
        let err = board
            .delete_comment(&alice(), comment.comment_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        board
            .delete_comment(&bob(), comment.comment_id)
            .await
            .unwrap();

        let err = board.delete_post(&bob(), post.post_id).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        board.delete_post(&alice(), post.post_id).await.unwrap();

        let err = board.get_post(post.post_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { resource: "post" }));
    }

    #[tokio::test]
    async fn admin_may_delete_someone_elses_post() {
        let board = board();
        let post = board.create_post(&alice(), "t", "c").await.unwrap();
        board.delete_post(&admin(), post.post_id).await.unwrap();
    }

    #[tokio::test]
    async fn missing_resources_are_not_found_before_permission() {
        let board = board();

        let err = board
            .update_post(&bob(), 999, Some("x"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { resource: "post" }));

        let err = board.delete_comment(&bob(), 999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { resource: "comment" }));

        let err = board.create_comment(&bob(), 999, "hi").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { resource: "post" }));
    }

    #[tokio::test]
    async fn comment_on_a_post_deleted_mid_request_is_not_found() {
        // posts still see the post, the comment store no longer has it
        let posts = Arc::new(InMemoryBoardRepo::new());
        let comments = Arc::new(InMemoryBoardRepo::new());
        let board = BoardService::new(posts, comments);

        let post = board.create_post(&alice(), "t", "c").await.unwrap();
        let err = board
            .create_comment(&bob(), post.post_id, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { resource: "post" }), "{err:?}");
    }

    #[tokio::test]
    async fn authors_unknown_to_the_credential_store_may_still_write() {
        // a token can outlive its identity row; writes are keyed by the token's email only
        let board = board();
        let ghost = CallerContext::new("deleted@x.com", Role::User);

        let post = board.create_post(&ghost, "t", "c").await.unwrap();
        let comment = board
            .create_comment(&ghost, post.post_id, "still here")
            .await
            .unwrap();
        assert_eq!(post.author_email, "deleted@x.com");
        assert_eq!(comment.author_email, "deleted@x.com");
    }

    #[tokio::test]
    async fn get_post_includes_comments_in_order() {
        let board = board();
        let post = board.create_post(&alice(), "t", "c").await.unwrap();
        board
            .create_comment(&bob(), post.post_id, "first")
            .await
            .unwrap();
        board
            .create_comment(&alice(), post.post_id, "second")
            .await
            .unwrap();

        let view = board.get_post(post.post_id).await.unwrap();
        let contents: Vec<_> = view.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
    }
}
