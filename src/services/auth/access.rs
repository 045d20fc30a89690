//! 所有リソース (post / comment) の更新・削除に対する認可判定。
//!
//! 純粋なポリシー判定:
//! - IO なし
//! - panic なし
//! - 所有リソースの種類によらず同じルール
//!
//! Update / Delete とも owner か ADMIN なら許可。匿名は `Unauthenticated`、
//! 認証済みだが権限なしは `Unauthorized` で拒否。
use std::fmt;

use thiserror::Error;

use super::CallerContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Update => "update",
            Action::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Unauthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("not allowed to {0} this resource")]
    Unauthorized(Action),
}

pub fn decide(caller: Option<&CallerContext>, owner_email: &str, action: Action) -> Decision {
    let Some(caller) = caller else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    let is_owner = caller.email == owner_email;
    let allowed = match action {
        Action::Update | Action::Delete => is_owner || caller.is_admin(),
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::Unauthorized)
    }
}

pub fn can_mutate(caller: Option<&CallerContext>, owner_email: &str, action: Action) -> bool {
    decide(caller, owner_email, action).is_allowed()
}

pub fn authorize(
    caller: Option<&CallerContext>,
    owner_email: &str,
    action: Action,
) -> Result<(), AccessError> {
    match decide(caller, owner_email, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(DenyReason::Unauthenticated) => Err(AccessError::Unauthenticated),
        Decision::Deny(DenyReason::Unauthorized) => {
            tracing::info!(
                email = caller.map(|c| c.email.as_str()).unwrap_or_default(),
                owner = owner_email,
                %action,
                "access denied"
            );
            Err(AccessError::Unauthorized(action))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::Role;

    const ACTIONS: [Action; 2] = [Action::Update, Action::Delete];

    fn caller(email: &str, role: Role) -> CallerContext {
        CallerContext::new(email, role)
    }

    #[test]
    fn anonymous_is_always_unauthenticated() {
        for owner in ["a@x.com", "b@x.com", ""] {
            for action in ACTIONS {
                assert_eq!(
                    decide(None, owner, action),
                    Decision::Deny(DenyReason::Unauthenticated)
                );
                assert_eq!(
                    authorize(None, owner, action),
                    Err(AccessError::Unauthenticated)
                );
            }
        }
    }

    #[test]
    fn owner_may_update_with_any_role() {
        for role in [Role::User, Role::Admin] {
            let me = caller("a@x.com", role);
            assert!(can_mutate(Some(&me), "a@x.com", Action::Update));
        }
    }

    #[test]
    fn admin_may_update_anything() {
        let admin = caller("root@x.com", Role::Admin);
        assert!(can_mutate(Some(&admin), "a@x.com", Action::Update));
        assert!(can_mutate(Some(&admin), "b@x.com", Action::Update));
    }

    #[test]
    fn delete_follows_the_same_owner_or_admin_rule() {
        let owner = caller("a@x.com", Role::User);
        let stranger = caller("b@x.com", Role::User);
        let admin = caller("root@x.com", Role::Admin);

        assert!(can_mutate(Some(&owner), "a@x.com", Action::Delete));
        assert!(can_mutate(Some(&admin), "a@x.com", Action::Delete));
        assert_eq!(
            decide(Some(&stranger), "a@x.com", Action::Delete),
            Decision::Deny(DenyReason::Unauthorized)
        );
    }

    #[test]
    fn non_owner_user_is_unauthorized() {
        let stranger = caller("b@x.com", Role::User);
        for action in ACTIONS {
            assert_eq!(
                authorize(Some(&stranger), "a@x.com", action),
                Err(AccessError::Unauthorized(action))
            );
        }
    }

    #[test]
    fn ownership_match_is_exact() {
        let me = caller("a@x.com", Role::User);
        assert!(!can_mutate(Some(&me), "A@x.com", Action::Update));
        assert!(!can_mutate(Some(&me), "a@x.com ", Action::Delete));
    }
}
