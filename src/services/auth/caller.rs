use super::Role;

/// Who is calling, as established from a validated bearer token.
///
/// Lives for one request only (request extensions); never persisted or shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub email: String,
    pub role: Role,
}

impl CallerContext {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
