/*
 * Responsibility
 *  - リソースごとの tag 付き ID 型 (リソースが増えたらここに 1 行足す)
 *  - decode ロジックも AppState へのアクセスも持たない
 */
use super::core::PublicId;

// posts
pub enum PostTag {}
pub type PublicPostId = PublicId<PostTag>;

// comments
pub enum CommentTag {}
pub type PublicCommentId = PublicId<CommentTag>;
