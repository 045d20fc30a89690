pub mod access;
pub mod authenticator;
pub mod caller;
pub mod email;
pub mod error;
pub mod factory;
pub mod password;
pub mod role;
pub mod service;
pub mod token;

pub use access::{AccessError, Action, Decision, DenyReason};
pub use caller::CallerContext;
pub use email::normalize_email;
pub use error::AuthError;
pub use factory::build_auth_service;
pub use password::{PasswordError, PasswordService};
pub use role::Role;
pub use service::{AuthService, LoginOutcome};
pub use token::{
    AccessTokenClaims, IssueError, IssuedToken, TokenError, TokenIssuer, TokenValidator,
};
