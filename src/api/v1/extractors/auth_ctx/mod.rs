/*!
 * 呼び出し元コンテキストの extractor
 *
 * Responsibility:
 * - request authenticator が extensions に入れた CallerContext を handler に渡す
 * - axum 依存は core、ラッパー型は types に置く
 *
 * Public API:
 * - MaybeCaller (公開エンドポイント用。拒否しない)
 * - RequireCaller (更新系エンドポイント用。匿名なら 401)
 */

mod core;
mod types;

pub use types::{MaybeCaller, RequireCaller};
