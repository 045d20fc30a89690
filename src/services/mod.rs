pub mod auth;
pub mod board;
pub mod id_codec;
