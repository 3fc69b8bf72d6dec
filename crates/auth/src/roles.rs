use serde::{Deserialize, Serialize};

use crate::ADMIN_ROLE;

/// A role name as carried in the token's `roles` claim.
///
/// The gate attaches no meaning to role names except [`ADMIN_ROLE`], which
/// unlocks admin-classified routes. Everything else is passed through to
/// handlers on the `PrincipalContext`. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self(ADMIN_ROLE.to_string())
    }

    pub fn is_admin(&self) -> bool {
        self.0 == ADMIN_ROLE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
