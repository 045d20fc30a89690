/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::access (request authenticator), http (request id / trace / 上限 / CORS / ヘッダ)
 */
pub mod auth;
pub mod http;
