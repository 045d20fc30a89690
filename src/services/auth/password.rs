//! パスワードの hash 化と照合 (Argon2id, PHC 文字列形式)。
//!
//! hash 化は意図的に遅い。async runtime 上から呼ぶ場合は
//! `tokio::task::spawn_blocking` 経由で実行すること。
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

use crate::config::PasswordHashCost;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("invalid password hash cost parameters")]
    InvalidCost,
    #[error("password hashing failed")]
    Hashing,
    #[error("stored password hash is malformed")]
    MalformedHash,
}

#[derive(Clone, Debug)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    pub fn new(cost: PasswordHashCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|_| PasswordError::InvalidCost)?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `secret` with a fresh random salt.
    pub fn hash(&self, secret: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| {
                tracing::error!(error = %e, "argon2 hashing failed");
                PasswordError::Hashing
            })
    }

    /// `Ok(false)` for a wrong secret; `Err` only when `stored_hash` cannot be used.
    ///
    /// The cost parameters embedded in `stored_hash` are used, not the configured ones,
    /// so older hashes keep verifying after a cost change.
    pub fn verify(&self, secret: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::MalformedHash)?;

        match self.argon2().verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                tracing::error!(error = %e, "stored password hash rejected by argon2");
                Err(PasswordError::MalformedHash)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordService {
        PasswordService::new(PasswordHashCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn correct_secret_verifies() {
        let svc = cheap();
        let hash = svc.hash("pw1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(svc.verify("pw1", &hash), Ok(true));
    }

    #[test]
    fn a_thousand_wrong_secrets_never_verify() {
        let svc = cheap();
        let hash = svc.hash("correct horse battery staple").unwrap();

        for n in 0..1_000 {
            let wrong = format!("wrong-{n}");
            assert_eq!(svc.verify(&wrong, &hash), Ok(false), "{wrong} verified");
        }
        assert_eq!(svc.verify("", &hash), Ok(false));
    }

    #[test]
    fn same_secret_gets_a_unique_salt() {
        let svc = cheap();
        let a = svc.hash("pw1").unwrap();
        let b = svc.hash("pw1").unwrap();

        assert_ne!(a, b);
        assert_eq!(svc.verify("pw1", &a), Ok(true));
        assert_eq!(svc.verify("pw1", &b), Ok(true));
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let svc = cheap();
        assert_eq!(
            svc.verify("pw1", "not-a-phc-string"),
            Err(PasswordError::MalformedHash)
        );
        assert_eq!(svc.verify("pw1", ""), Err(PasswordError::MalformedHash));
    }

    #[test]
    fn hashes_made_with_another_cost_still_verify() {
        let old = PasswordService::new(PasswordHashCost {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = old.hash("pw1").unwrap();

        assert_eq!(cheap().verify("pw1", &hash), Ok(true));
    }

    #[test]
    fn impossible_cost_is_rejected() {
        let err = PasswordService::new(PasswordHashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .unwrap_err();
        assert_eq!(err, PasswordError::InvalidCost);
    }
}
