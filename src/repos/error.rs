/*
 * Responsibility
 * - repo が上位に伝える意味の定義 (409 か 404 か 500 かは呼び出し側が決める)
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[source] sqlx::Error),
    #[error("conflict")]
    Conflict,
    #[error("corrupt row: {0}")]
    Corrupt(&'static str),
}

impl RepoError {
    // 23505 = unique_violation, 23503 = foreign_key_violation
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && matches!(dbe.code().as_deref(), Some("23505") | Some("23503"))
        {
            return RepoError::Conflict;
        }
        RepoError::Db(e)
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        Self::from_sqlx(e)
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
