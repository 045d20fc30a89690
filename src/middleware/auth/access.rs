//! request authenticator: bearer トークン → `CallerContext` を extensions に入れる
//!
//! リクエストごとに handler の前で 1 回だけ走り、拒否はしない：
//! - `Authorization` ヘッダなし / 別スキーム / 不正トークン => 匿名 (何も入れない)
//! - 正しいトークン => extractor 用に `CallerContext` を入れる
//!
//! 匿名で良いかどうかは handler 側で決める (`RequireCaller` -> 401)。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::state::AppState;

/// Apply the authenticator to every route of `router`.
///
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8: State は `from_fn_with_state` で明示的に渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let raw = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if let Some(caller) = state.auth.authenticate(raw) {
        // middleware -> extractor
        req.extensions_mut().insert(caller);
    }

    next.run(req).await
}
