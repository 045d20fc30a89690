/*
 * Responsibility
 * - GET /health (liveness)。認証不要、authenticator は何もせず通す
 */
use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
