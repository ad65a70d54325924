use sea_orm::TransactionTrait;

use crate::{BuyCmd, EngineError, Receipt, ResultEngine, Role, util::require_positive};

use super::{Engine, with_tx};

impl Engine {
    /// Buy `cmd.quantity` units of a product with the buyer's balance.
    ///
    /// Steps, in order, each one terminal on failure:
    /// 1. resolve the buyer (buyer role only) and the product;
    /// 2. compute `cost * quantity`;
    /// 3. reject when the total exceeds the balance, without touching it;
    /// 4. debit the balance in a single conditional update;
    /// 5. return the receipt with the remaining balance as change.
    ///
    /// The only write is step 4. Product stock is not tracked, so the same
    /// product can be bought again as long as funds allow.
    pub async fn buy(&self, cmd: BuyCmd) -> ResultEngine<Receipt> {
        let BuyCmd {
            user_id,
            product_id,
            quantity,
        } = cmd;
        require_positive(quantity, "quantity")?;

        let buyer = self
            .require_account_with_role(&self.database, user_id, Role::Buyer)
            .await?;
        let product = self.require_product(&self.database, product_id).await?;

        let total_cost = require_positive(product.cost, "product cost")?
            .checked_mul(quantity)
            .ok_or_else(|| EngineError::InvalidAmount("total cost is too large".to_string()))?;

        if total_cost > buyer.deposit {
            tracing::debug!(%user_id, %product_id, total_cost, balance = buyer.deposit, "purchase rejected");
            return Err(EngineError::InsufficientFunds(format!(
                "balance {} is lower than {total_cost}",
                buyer.deposit
            )));
        }

        let change = with_tx!(self, |db_tx| {
            self.debit(&db_tx, user_id, total_cost).await
        })?;

        tracing::info!(%user_id, %product_id, quantity, total_cost, change, "purchase settled");
        Ok(Receipt {
            product_id,
            quantity_purchased: quantity,
            amount_spent: total_cost,
            change,
        })
    }
}
