pub mod comment_repo;
pub mod error;
pub mod memory;
pub mod post_repo;
pub mod user_repo;

pub use comment_repo::{CommentRow, CommentStore, PgCommentRepo};
pub use error::{RepoError, RepoResult};
pub use memory::{InMemoryBoardRepo, InMemoryUserRepo};
pub use post_repo::{PgPostRepo, PostRow, PostStore};
pub use user_repo::{CredentialStore, Identity, PgUserRepo};
