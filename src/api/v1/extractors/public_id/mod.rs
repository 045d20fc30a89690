/*
 * Responsibility
 *  - core と types を束ねる
 *  - handler から見える範囲を制御する
 */
mod core;
mod types;

pub use types::*;
