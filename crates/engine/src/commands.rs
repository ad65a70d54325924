//! Command and patch structs for engine operations.
//!
//! Partial updates are explicit structs listing the mutable fields of each
//! entity; `None` leaves a field untouched. Nothing else can be patched.

use uuid::Uuid;

use crate::Role;

/// Buy `quantity` units of a product.
#[derive(Clone, Debug)]
pub struct BuyCmd {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
}

impl BuyCmd {
    #[must_use]
    pub fn new(user_id: Uuid, product_id: Uuid, quantity: i64) -> Self {
        Self {
            user_id,
            product_id,
            quantity,
        }
    }
}

/// Register a new account.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    /// Defaults to [`Role::Buyer`].
    pub role: Option<Role>,
}

impl NewAccount {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            full_name: None,
            phone: None,
            role: None,
        }
    }

    #[must_use]
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct AccountPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone.is_none() && self.role.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct NewProduct {
    pub product_name: String,
    pub cost: i64,
}

impl NewProduct {
    #[must_use]
    pub fn new(product_name: impl Into<String>, cost: i64) -> Self {
        Self {
            product_name: product_name.into(),
            cost,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProductPatch {
    pub product_name: Option<String>,
    pub cost: Option<i64>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none() && self.cost.is_none()
    }
}
