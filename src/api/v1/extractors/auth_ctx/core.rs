use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::CallerContext;
use crate::state::AppState;

use super::types::{MaybeCaller, RequireCaller};

fn caller_from(parts: &Parts) -> Option<CallerContext> {
    parts.extensions.get::<CallerContext>().cloned()
}

impl FromRequestParts<AppState> for MaybeCaller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeCaller(caller_from(parts)))
    }
}

/// Missing context means anonymous (no/invalid token) or the authenticator is not mounted.
impl FromRequestParts<AppState> for RequireCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        caller_from(parts)
            .map(RequireCaller)
            .ok_or(AppError::Unauthenticated)
    }
}
