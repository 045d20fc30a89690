/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 全 route が authenticator の内側。認証必須かどうかは handler が MaybeCaller / RequireCaller で選ぶ
 */
use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{login, me, signup},
    comments::{create_comment, delete_comment},
    health::health,
    posts::{create_post, delete_post, get_post, list_posts, update_post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{post_id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/posts/{post_id}/comments", post(create_comment))
        .route("/posts/comments/{comment_id}", delete(delete_comment))
}
