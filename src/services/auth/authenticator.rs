//! リクエスト認証 (HTTP スタックには依存しない)。
//!
//! 生の `Authorization` ヘッダ値を Option の呼び出し元に変える。失敗はしない:
//! ヘッダなし / 別スキーム / 不正トークンはすべて「匿名」で、
//! 匿名で良いかは後段の操作が決める。
use chrono::{DateTime, Utc};

use super::{CallerContext, TokenValidator};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token part of a `Bearer <token>` header value.
pub fn bearer_token(raw_header: Option<&str>) -> Option<&str> {
    raw_header?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn authenticate(
    raw_header: Option<&str>,
    validator: &TokenValidator,
) -> Option<CallerContext> {
    authenticate_at(raw_header, validator, Utc::now())
}

pub fn authenticate_at(
    raw_header: Option<&str>,
    validator: &TokenValidator,
    now: DateTime<Utc>,
) -> Option<CallerContext> {
    let token = bearer_token(raw_header)?;

    match validator.validate_at(token, now) {
        Ok(caller) => {
            tracing::debug!(email = %caller.email, role = %caller.role, "caller authenticated");
            Some(caller)
        }
        Err(reason) => {
            tracing::warn!(%reason, "bearer token rejected; continuing as anonymous");
            None
        }
    }
}
