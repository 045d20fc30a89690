/*
 * Responsibility
 * - credential store: identity key (email), password hash, role
 * - auth core が触るのは signup / login の時だけ。リクエストごとには引かない
 */
use std::fmt;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::Role;

/// A registered identity as the credential store keeps it.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the hash
        f.debug_struct("Identity")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Identity>>;

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool>;

    /// Insert a new identity. Returns `RepoError::Conflict` if the email is taken.
    async fn save(&self, identity: &Identity) -> RepoResult<()>;
}

#[derive(Debug, FromRow)]
struct UserRow {
    email: String,
    #[sqlx(rename = "passwordHash")]
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for Identity {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or(RepoError::Corrupt("users.role"))?;
        Ok(Identity {
            email: row.email,
            password_hash: row.password_hash,
            role,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Identity>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT email, "passwordHash", role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn save(&self, identity: &Identity) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (email, "passwordHash", role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(())
    }
}
