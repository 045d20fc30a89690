/*
 * Responsibility
 * - POST /posts/{post_id}/comments, DELETE /posts/comments/{comment_id}
 * - comment の削除も post と同じ owner-or-admin ルール
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::posts::{CommentResponse, CreateCommentRequest},
        extractors::{
            RequireCaller,
            public_id::{PublicCommentId, PublicPostId},
        },
        handlers::posts::comment_to_response,
    },
    error::AppError,
    state::AppState,
};

pub async fn create_comment(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    post_id: PublicPostId,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let row = state
        .board
        .create_comment(&caller, post_id.id, &req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(comment_to_response(&state, Some(&caller), row)?),
    ))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    comment_id: PublicCommentId,
) -> Result<StatusCode, AppError> {
    state.board.delete_comment(&caller, comment_id.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
