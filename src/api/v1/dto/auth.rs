/*
 * Responsibility
 * - signup / login の request / response DTO
 * - validate() は形式チェックのみ (資格情報の照合は AuthService 側)
 * - 長さ制限は byte 数ではなく文字数で数える
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::{Role, normalize_email};

const MAX_PASSWORD_CHARS: usize = 128;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        normalize_email(&self.email)?;
        if self.password.is_empty() {
            return Err("password is required");
        }
        if self.password.chars().count() > MAX_PASSWORD_CHARS {
            return Err("password must be <= 128 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        normalize_email(&self.email)?;
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub email: String,
    pub role: Role,
    pub token: String,
    /// Always "Bearer"
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub email: String,
    pub role: Role,
}
