use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Role, users};

use super::{Engine, with_tx};

impl Engine {
    /// Add one coin to a buyer's balance and return the new balance.
    ///
    /// Authorization: buyer only. `amount` must be one of
    /// [`Engine::denominations`].
    pub async fn deposit(&self, user_id: Uuid, amount: i64) -> ResultEngine<i64> {
        self.require_account_with_role(&self.database, user_id, Role::Buyer)
            .await?;
        self.denominations.check(amount)?;

        let balance = with_tx!(self, |db_tx| {
            let result = users::Entity::update_many()
                .col_expr(
                    users::Column::Deposit,
                    Expr::col(users::Column::Deposit).add(amount),
                )
                .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(users::Column::Id.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::Persistence("deposit failed".to_string()));
            }
            self.balance_in(&db_tx, user_id).await
        })?;

        tracing::info!(%user_id, amount, balance, "deposit accepted");
        Ok(balance)
    }

    /// Set a buyer's balance back to zero, whatever it was.
    ///
    /// Authorization: buyer only.
    pub async fn reset_deposit(&self, user_id: Uuid) -> ResultEngine<()> {
        self.require_account_with_role(&self.database, user_id, Role::Buyer)
            .await?;

        let result = users::Entity::update_many()
            .col_expr(users::Column::Deposit, Expr::value(0i64))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(user_id.to_string()))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Persistence("reset failed".to_string()));
        }

        tracing::info!(%user_id, "deposit reset");
        Ok(())
    }

    /// Current balance of an account.
    pub async fn balance(&self, user_id: Uuid) -> ResultEngine<i64> {
        let account = self.require_account(&self.database, user_id).await?;
        Ok(account.deposit)
    }

    /// Subtract `amount` from the balance and return what is left.
    ///
    /// The affordability check and the subtraction are one conditional
    /// statement, so concurrent debits cannot both pass against the same
    /// stale balance. Zero affected rows means either the account is gone
    /// (`Persistence`) or the balance is too low (`InsufficientFunds`).
    pub(super) async fn debit<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        amount: i64,
    ) -> ResultEngine<i64> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::Deposit,
                Expr::col(users::Column::Deposit).sub(amount),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(user_id.to_string()))
            .filter(users::Column::Deposit.gte(amount))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return match self.find_account(db, user_id).await? {
                None => Err(EngineError::Persistence(
                    "purchase failed, account not exists".to_string(),
                )),
                Some(account) => Err(EngineError::InsufficientFunds(format!(
                    "balance {} is lower than {amount}",
                    account.deposit
                ))),
            };
        }

        self.balance_in(db, user_id).await
    }

    async fn balance_in<C: ConnectionTrait>(&self, db: &C, user_id: Uuid) -> ResultEngine<i64> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .map(|model| model.deposit)
            .ok_or_else(|| EngineError::Persistence("account vanished".to_string()))
    }
}
