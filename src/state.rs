/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: AuthService (署名鍵はこの中。起動後は読み取りのみ)
 *   - board: BoardService, id_codec: IdCodec
 * - Clone 前提で持つ (内部は Arc で cheap)
 */
use std::sync::Arc;

use crate::services::{auth::AuthService, board::BoardService, id_codec::IdCodec};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub board: Arc<BoardService>,
    pub id_codec: IdCodec,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, board: Arc<BoardService>, id_codec: IdCodec) -> Self {
        Self {
            auth,
            board,
            id_codec,
        }
    }
}
