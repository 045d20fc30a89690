use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{CallerContext, Role};

/// Access token claims (HS256 JWT payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Identity key (email).
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Why an inbound token was not accepted.
///
/// Only used for logs; externally every variant means "anonymous".
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

/// Why a token could not be minted.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("token ttl of {ttl_seconds}s cannot be represented")]
    TtlOutOfRange { ttl_seconds: u64 },
    #[error("failed to sign access token")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: u64,
}

/// Mints access tokens with the process-wide HS256 key.
///
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            ttl_seconds,
        }
    }

    pub fn issue(&self, email: &str, role: Role) -> Result<IssuedToken, IssueError> {
        self.issue_at(email, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, IssueError> {
        // `as i64` だと u64::MAX が -1 に化けて発行直後に期限切れになる
        let expires_at = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(IssueError::TtlOutOfRange {
                ttl_seconds: self.ttl_seconds,
            })?;

        let iat = now.timestamp();
        let exp = expires_at.timestamp();

        let claims = AccessTokenClaims {
            sub: email.to_string(),
            role,
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: self.ttl_seconds,
        })
    }
}

/// Verifies inbound access tokens. No store lookup: identity and role come
/// straight from the signed payload.
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl TokenValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is compared against an explicit clock in `validate_at` (no leeway)
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Result<CallerContext, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Structure, then signature, then expiry (`now >= exp` is expired).
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<CallerContext, TokenError> {
        let data = jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(classify)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(CallerContext::new(claims.sub, claims.role))
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        // alg other than HS256 cannot have been signed with our key
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::{Duration as ChronoDuration, TimeZone};

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret!";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()
    }

    fn pair(ttl: u64) -> (TokenIssuer, TokenValidator) {
        (TokenIssuer::new(SECRET, ttl), TokenValidator::new(SECRET))
    }

    fn rewrite_payload(token: &str, edit: impl FnOnce(String) -> String) -> String {
        let parts: Vec<&str> = token.split('.').collect();
        let payload = String::from_utf8(URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        let payload = URL_SAFE_NO_PAD.encode(edit(payload));
        format!("{}.{}.{}", parts[0], payload, parts[2])
    }

    #[test]
    fn issued_token_validates_to_same_identity_and_role() {
        let (issuer, validator) = pair(3600);

        for role in [Role::User, Role::Admin] {
            let issued = issuer.issue("a@x.com", role).unwrap();
            assert!(!issued.token.is_empty());
            assert_eq!(issued.expires_in, 3600);

            let caller = validator.validate(&issued.token).unwrap();
            assert_eq!(caller, CallerContext::new("a@x.com", role));
        }
    }

    #[test]
    fn valid_until_but_not_at_expiry() {
        let (issuer, validator) = pair(60);
        let now = fixed_now();
        let issued = issuer.issue_at("a@x.com", Role::User, now).unwrap();

        assert!(validator.validate_at(&issued.token, now).is_ok());
        assert!(
            validator
                .validate_at(&issued.token, now + ChronoDuration::seconds(59))
                .is_ok()
        );
        assert_eq!(
            validator.validate_at(&issued.token, issued.expires_at),
            Err(TokenError::Expired)
        );
        assert_eq!(
            validator.validate_at(&issued.token, now + ChronoDuration::hours(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn token_issued_in_the_past_is_expired_now() {
        let (issuer, validator) = pair(60);
        let issued = issuer
            .issue_at("a@x.com", Role::User, Utc::now() - ChronoDuration::minutes(5))
            .unwrap();

        assert_eq!(validator.validate(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn flipping_the_role_breaks_the_signature() {
        let (issuer, validator) = pair(3600);
        let issued = issuer.issue("a@x.com", Role::User).unwrap();

        let forged = rewrite_payload(&issued.token, |p| {
            assert!(p.contains("\"role\":\"USER\""));
            p.replace("\"role\":\"USER\"", "\"role\":\"ADMIN\"")
        });

        assert_eq!(
            validator.validate(&forged),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn changing_the_subject_breaks_the_signature() {
        let (issuer, validator) = pair(3600);
        let issued = issuer.issue("a@x.com", Role::User).unwrap();

        let forged = rewrite_payload(&issued.token, |p| p.replace("a@x.com", "b@x.com"));

        assert_eq!(
            validator.validate(&forged),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let other = TokenIssuer::new(b"another-secret-another-secret-!!", 3600);
        let issued = other.issue("a@x.com", Role::Admin).unwrap();

        assert_eq!(
            TokenValidator::new(SECRET).validate(&issued.token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn structurally_broken_tokens_are_malformed() {
        let validator = TokenValidator::new(SECRET);

        for raw in ["", "abc", "a.b", "a.b.c", "!!!.###.$$$"] {
            assert_eq!(validator.validate(raw), Err(TokenError::Malformed), "{raw}");
        }
    }

    #[test]
    fn expiry_is_checked_only_after_the_signature() {
        let (issuer, validator) = pair(1);
        let issued = issuer
            .issue_at("a@x.com", Role::User, fixed_now() - ChronoDuration::days(1))
            .unwrap();
        let forged = rewrite_payload(&issued.token, |p| p.replace("USER", "ADMIN"));

        assert_eq!(
            validator.validate(&forged),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn debug_output_hides_key_material() {
        let (issuer, validator) = pair(60);
        let printed = format!("{issuer:?} {validator:?}");
        assert!(!printed.contains("test-secret"));
    }

    #[test]
    fn unrepresentable_ttl_is_an_error_not_a_panic() {
        for ttl in [u64::MAX, 100_000_000_000_000_000, i64::MAX as u64] {
            let issuer = TokenIssuer::new(SECRET, ttl);
            assert!(
                matches!(
                    issuer.issue_at("a@x.com", Role::User, fixed_now()),
                    Err(IssueError::TtlOutOfRange { ttl_seconds }) if ttl_seconds == ttl
                ),
                "{ttl}"
            );
        }
    }

    #[test]
    fn longest_configured_ttl_still_validates() {
        let ttl = crate::config::MAX_ACCESS_TOKEN_TTL_SECONDS;
        let (issuer, validator) = pair(ttl);

        let issued = issuer.issue_at("a@x.com", Role::User, fixed_now()).unwrap();
        assert_eq!(issued.expires_at, fixed_now() + ChronoDuration::days(30));
        assert!(validator.validate_at(&issued.token, fixed_now()).is_ok());
    }
}
