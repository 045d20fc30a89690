/*
 * Responsibility
 * - 環境変数から設定を読み込む (JWT secret, token TTL, hash cost, DB, CORS など)
 * - 設定値のバリデーション (不正なら起動失敗。最初のリクエストで落ちない)
 * - 値はプロセスの生存期間中は不変
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::services::auth::normalize_email;

/// Minimum accepted length of `JWT_SECRET` in bytes (HS256 key size).
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Upper bound of `ACCESS_TOKEN_TTL_SECONDS` (30 days).
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Self {
        match raw
            .unwrap_or("development")
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Argon2id cost parameters used for newly hashed passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashCost {
    fn default() -> Self {
        // OWASP baseline for Argon2id (19 MiB, t=2, p=1).
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Identity seeded with the ADMIN role at startup when it does not exist yet.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // None => in-memory store
    pub database_url: Option<String>,

    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_seconds: u64,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    pub jwt_secret: String,
    pub access_token_ttl_seconds: u64,
    pub password_hash_cost: PasswordHashCost,

    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 署名鍵と DB の認証情報は出力しない
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database", &self.database_url.as_ref().map(|_| "postgres"))
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("password_hash_cost", &self.password_hash_cost)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (env, map in tests, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = parse_or(get("PORT"), "PORT", 3000)?;
        let addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV").as_deref());

        let database_url = get("DATABASE_URL");

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout_seconds: u64 =
            parse_or(get("REQUEST_TIMEOUT_SECONDS"), "REQUEST_TIMEOUT_SECONDS", 30)?;
        if request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }

        let sqids_min_length: usize = parse_or(get("SQIDS_MIN_LENGTH"), "SQIDS_MIN_LENGTH", 10)?;
        let sqids_alphabet = get("SQIDS_ALPHABET").unwrap_or_else(|| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let access_token_ttl_seconds: u64 =
            parse_or(get("ACCESS_TOKEN_TTL_SECONDS"), "ACCESS_TOKEN_TTL_SECONDS", 3600)?;
        if !(1..=MAX_ACCESS_TOKEN_TTL_SECONDS).contains(&access_token_ttl_seconds) {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
        }

        let defaults = PasswordHashCost::default();
        let password_hash_cost = PasswordHashCost {
            memory_kib: parse_or(
                get("PASSWORD_HASH_MEMORY_KIB"),
                "PASSWORD_HASH_MEMORY_KIB",
                defaults.memory_kib,
            )?,
            iterations: parse_or(
                get("PASSWORD_HASH_ITERATIONS"),
                "PASSWORD_HASH_ITERATIONS",
                defaults.iterations,
            )?,
            parallelism: parse_or(
                get("PASSWORD_HASH_PARALLELISM"),
                "PASSWORD_HASH_PARALLELISM",
                defaults.parallelism,
            )?,
        };

        let bootstrap_admin = match (
            get("BOOTSTRAP_ADMIN_EMAIL"),
            get("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => {
                // login 側と同じ形に揃える (前後の空白で入れない admin を作らない)
                let email = normalize_email(&email)
                    .map_err(|_| ConfigError::Invalid("BOOTSTRAP_ADMIN_EMAIL"))?
                    .to_string();
                Some(BootstrapAdmin { email, password })
            }
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("BOOTSTRAP_ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("BOOTSTRAP_ADMIN_EMAIL")),
        };

        Ok(Self {
            addr,
            app_env,
            database_url,
            cors_allowed_origins,
            request_timeout_seconds,
            sqids_min_length,
            sqids_alphabet,
            jwt_secret,
            access_token_ttl_seconds,
            password_hash_cost,
            bootstrap_admin,
        })
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
