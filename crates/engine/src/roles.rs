//! Account roles and the checks gating every mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Account, EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Buyer,
    Seller,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            _ => Err(EngineError::InvalidRole(format!("invalid role: {value}"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fails with [`EngineError::Unauthorized`] unless `account` has `role`.
pub fn require_role(account: &Account, role: Role) -> ResultEngine<()> {
    if account.role != role {
        return Err(EngineError::Unauthorized(format!("user is not a {role}")));
    }
    Ok(())
}

/// Fails with [`EngineError::Forbidden`] unless `account` is `owner_id`.
pub fn require_owner(account: &Account, owner_id: Uuid) -> ResultEngine<()> {
    if account.id != owner_id {
        return Err(EngineError::Forbidden(
            "user does not own this product".to_string(),
        ));
    }
    Ok(())
}
