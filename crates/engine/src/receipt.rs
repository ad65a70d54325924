use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a successful purchase. Not persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub product_id: Uuid,
    pub quantity_purchased: i64,
    pub amount_spent: i64,
    /// Buyer balance left after the purchase.
    pub change: i64,
}
