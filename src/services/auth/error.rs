use thiserror::Error;

use super::{IssueError, PasswordError};
use crate::repos::RepoError;

/// Failures of the signup/login flows.
///
/// `InvalidCredentials` covers both "unknown email" and "wrong password".
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("identity already exists")]
    DuplicateIdentity,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("failed to issue access token")]
    Issue(#[source] IssueError),

    #[error("password worker failed")]
    Worker(#[source] tokio::task::JoinError),
}
