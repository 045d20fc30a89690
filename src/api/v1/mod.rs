/*
 * Responsibility
 * - v1 の公開ポイント (routes() と、その裏の dto / extractor / handler)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
