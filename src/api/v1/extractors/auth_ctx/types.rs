/*
 * Responsibility
 * - handler が受け取れる呼び出し元の型
 * - トークン検証は middleware で済んでいて、CallerContext は request extensions にある
 *   handler はこのラッパーだけを見る
 */
use crate::services::auth::CallerContext;

/// Caller if the request carried a valid bearer token, `None` for anonymous.
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Option<CallerContext>);

/// Authenticated caller. Extraction fails with 401 `UNAUTHENTICATED` for anonymous requests.
#[derive(Debug, Clone)]
pub struct RequireCaller(pub CallerContext);
