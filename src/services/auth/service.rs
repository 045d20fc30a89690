use std::sync::Arc;

use tracing::{debug, error, info};

use super::{
    AuthError, CallerContext, IssuedToken, PasswordService, Role, TokenIssuer, TokenValidator,
    authenticator,
};
use crate::repos::{CredentialStore, Identity, RepoError};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub email: String,
    pub role: Role,
    pub access_token: IssuedToken,
}

/// Signup and login flows on top of the credential store.
///
/// Orchestrates:
/// - PasswordService (Argon2id hash/verify, run off the async executor)
/// - TokenIssuer (HS256 access tokens)
/// - TokenValidator (used by the request authenticator)
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    passwords: PasswordService,
    issuer: TokenIssuer,
    validator: TokenValidator,
    // email が存在しない場合もこれで照合して、どちらの失敗でも同じ時間をかける
    dummy_hash: Arc<str>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.issuer)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        passwords: PasswordService,
        issuer: TokenIssuer,
        validator: TokenValidator,
    ) -> Result<Self, AuthError> {
        let dummy_hash = passwords.hash("dummy-password-for-unknown-identities")?;

        Ok(Self {
            users,
            passwords,
            issuer,
            validator,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Register a new identity with the USER role.
    pub async fn signup(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.register(email, password, Role::User).await
    }

    /// Register a new identity with an explicit role (admin provisioning).
    pub async fn register(&self, email: &str, password: &str, role: Role) -> Result<(), AuthError> {
        if self.users.exists_by_email(email).await? {
            debug!(email = %email, "signup rejected: identity exists");
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = self.hash_off_thread(password).await?;

        let identity = Identity {
            email: email.to_string(),
            password_hash,
            role,
        };

        match self.users.save(&identity).await {
            Ok(()) => {
                info!(email = %email, role = %role, "identity registered");
                Ok(())
            }
            // 同じ email の signup と競合して負けた
            Err(RepoError::Conflict) => Err(AuthError::DuplicateIdentity),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials and mint an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let identity = self.users.find_by_email(email).await?;

        let Some(identity) = identity else {
            let _ = self
                .verify_off_thread(password, self.dummy_hash.to_string())
                .await;
            debug!(email = %email, "login rejected: unknown identity");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .verify_off_thread(password, identity.password_hash.clone())
            .await
            .inspect_err(|e| error!(email = %email, error = %e, "password verification failed"))?;

        if !matches {
            debug!(email = %email, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self
            .issuer
            .issue(&identity.email, identity.role)
            .map_err(|e| {
                error!(error = %e, "failed to issue access token");
                AuthError::Issue(e)
            })?;

        info!(email = %identity.email, role = %identity.role, "login succeeded");

        Ok(LoginOutcome {
            email: identity.email,
            role: identity.role,
            access_token,
        })
    }

    /// Entry point for the request authenticator.
    pub fn authenticate(&self, raw_header: Option<&str>) -> Option<CallerContext> {
        authenticator::authenticate(raw_header, &self.validator)
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    async fn hash_off_thread(&self, password: &str) -> Result<String, AuthError> {
        let passwords = self.passwords.clone();
        let password = password.to_string();

        let hash = tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(AuthError::Worker)??;

        Ok(hash)
    }

    async fn verify_off_thread(
        &self,
        password: &str,
        stored_hash: String,
    ) -> Result<bool, AuthError> {
        let passwords = self.passwords.clone();
        let password = password.to_string();

        let matches = tokio::task::spawn_blocking(move || passwords.verify(&password, &stored_hash))
            .await
            .map_err(AuthError::Worker)??;

        Ok(matches)
    }
}
