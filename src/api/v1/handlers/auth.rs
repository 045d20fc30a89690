/*
 * Responsibility
 * - POST /auth/signup, POST /auth/login, GET /auth/me
 * - DTO の形式チェックはここ。資格情報の照合とトークン発行は AuthService
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::auth::{LoginRequest, LoginResponse, MeResponse, SignupRequest, SignupResponse},
        extractors::RequireCaller,
    },
    error::AppError,
    services::auth::Role,
    state::AppState,
};

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let email = req.email.trim();
    state.auth.signup(email, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            email: email.to_string(),
            role: Role::User,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let out = state.auth.login(req.email.trim(), &req.password).await?;

    Ok(Json(LoginResponse {
        email: out.email,
        role: out.role,
        token: out.access_token.token,
        token_type: "Bearer",
        expires_in: out.access_token.expires_in,
    }))
}

pub async fn me(RequireCaller(caller): RequireCaller) -> Json<MeResponse> {
    Json(MeResponse {
        email: caller.email,
        role: caller.role,
    })
}
