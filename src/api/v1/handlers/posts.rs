/*
 * Responsibility
 * - /posts 系 handler
 * - Path の id は公開 ID → PublicPostId extractor で内部 ID に変換して受け取る
 * - 参照は認証不要 (MaybeCaller は can_edit / can_delete の算出にだけ使う)
 * - 更新系は RequireCaller を取り、認可判定は BoardService 側
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    api::v1::{
        dto::posts::{CommentResponse, CreatePostRequest, PostResponse, UpdatePostRequest},
        extractors::{MaybeCaller, RequireCaller, public_id::PublicPostId},
    },
    error::AppError,
    repos::{CommentRow, PostRow},
    services::auth::{Action, CallerContext, access},
    state::AppState,
};

pub(crate) fn post_to_response(
    state: &AppState,
    caller: Option<&CallerContext>,
    row: PostRow,
) -> Result<PostResponse, AppError> {
    Ok(PostResponse {
        id: state.id_codec.encode(row.post_id)?,
        can_edit: access::can_mutate(caller, &row.author_email, Action::Update),
        title: row.title,
        content: row.content,
        author_email: row.author_email,
        comments: None,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(crate) fn comment_to_response(
    state: &AppState,
    caller: Option<&CallerContext>,
    row: CommentRow,
) -> Result<CommentResponse, AppError> {
    Ok(CommentResponse {
        id: state.id_codec.encode(row.comment_id)?,
        post_id: state.id_codec.encode(row.post_id)?,
        can_delete: access::can_mutate(caller, &row.author_email, Action::Delete),
        content: row.content,
        author_email: row.author_email,
        created_at: row.created_at,
    })
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: i64,
}

pub async fn list_posts(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let rows = state.board.list_posts(query.offset).await?;

    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(post_to_response(&state, caller.as_ref(), row)?);
    }

    Ok(Json(res))
}

pub async fn create_post(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let row = state
        .board
        .create_post(&caller, req.title.trim(), &req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(post_to_response(&state, Some(&caller), row)?),
    ))
}

pub async fn get_post(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    post_id: PublicPostId,
) -> Result<Json<PostResponse>, AppError> {
    let view = state.board.get_post(post_id.id).await?;

    let mut comments = Vec::with_capacity(view.comments.len());
    for row in view.comments {
        comments.push(comment_to_response(&state, caller.as_ref(), row)?);
    }

    let mut res = post_to_response(&state, caller.as_ref(), view.post)?;
    res.comments = Some(comments);
    Ok(Json(res))
}

pub async fn update_post(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    post_id: PublicPostId,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let row = state
        .board
        .update_post(
            &caller,
            post_id.id,
            req.title.as_deref().map(str::trim),
            req.content.as_deref(),
        )
        .await?;

    Ok(Json(post_to_response(&state, Some(&caller), row)?))
}

pub async fn delete_post(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    post_id: PublicPostId,
) -> Result<StatusCode, AppError> {
    state.board.delete_post(&caller, post_id.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
