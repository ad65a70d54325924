//! JSON payloads exchanged with the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;

/// Role of an account.
///
/// - `buyer`: may deposit coins, reset its deposit and buy products.
/// - `seller`: may create, update and delete the products it owns.
///
/// Accepted in any letter case (`"Seller"`, `"BUYER"`), always sent back in
/// lowercase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Buyer,
    Seller,
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_lowercase().as_str() {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            _ => Err(de::Error::unknown_variant(&raw, &["buyer", "seller"])),
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Stable machine readable failure kind (e.g. `insufficient_funds`).
    pub kind: String,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub email: String,
        pub password: String,
        pub full_name: Option<String>,
        pub phone: Option<String>,
        pub role: Option<Role>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub user_id: Uuid,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub full_name: Option<String>,
        pub phone: Option<String>,
        pub role: Option<Role>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
        pub user_name: String,
        pub full_name: Option<String>,
        pub phone: Option<String>,
        pub role: Role,
        pub deposit: i64,
        pub is_verified: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub expires_at: DateTime<Utc>,
        /// `true` when another session of the same account was already open.
        pub other_sessions_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionsRevoked {
        pub revoked: u64,
    }
}

pub mod product {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductNew {
        pub product_name: String,
        pub cost: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProductUpdate {
        pub product_name: Option<String>,
        pub cost: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductCreated {
        pub product_id: Uuid,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ProductView {
        pub id: Uuid,
        pub product_name: String,
        pub cost: i64,
        pub seller_id: Uuid,
    }
}

pub mod vending {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositRequest {
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub deposit: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BuyRequest {
        pub product_id: Uuid,
        pub quantity: i64,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BuyResponse {
        pub product_id: Uuid,
        pub quantity_purchased: i64,
        pub amount_spent: i64,
        pub change: i64,
    }
}
