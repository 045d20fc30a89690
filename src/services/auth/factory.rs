/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::repos::CredentialStore;
use crate::services::auth::{AuthError, AuthService, PasswordService, TokenIssuer, TokenValidator};

pub fn build_auth_service(
    config: &Config,
    users: Arc<dyn CredentialStore>,
) -> Result<Arc<AuthService>, AuthError> {
    let secret = config.jwt_secret.as_bytes();

    let passwords = PasswordService::new(config.password_hash_cost)?;
    let issuer = TokenIssuer::new(secret, config.access_token_ttl_seconds);
    let validator = TokenValidator::new(secret);

    let auth = AuthService::new(users, passwords, issuer, validator)?;

    Ok(Arc::new(auth))
}
