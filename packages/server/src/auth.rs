use serde::{Deserialize, Serialize};

use crate::error::{ContestError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Contestant,
}

/// Identity of whoever invokes an operation, as established by the
/// authentication layer in front of this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthUser {
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    pub fn contestant(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Contestant,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act for anyone; everyone else only for themselves.
    pub fn require_self_or_admin(&self, user_id: &str) -> Result<()> {
        if self.is_admin() || self.user_id == user_id {
            return Ok(());
        }
        Err(ContestError::Authorization(user_id.to_string()))
    }
}
