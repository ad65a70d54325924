use sea_orm::{ConnectionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, EngineError, Product, ResultEngine, Role, products, require_owner, require_role,
    users,
};

use super::Engine;

impl Engine {
    pub(super) async fn find_account<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<Option<Account>> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    pub(super) async fn require_account<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<Account> {
        self.find_account(db, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Load the caller and make sure it holds `role`.
    pub(super) async fn require_account_with_role<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        role: Role,
    ) -> ResultEngine<Account> {
        let account = self.require_account(db, user_id).await?;
        require_role(&account, role)?;
        Ok(account)
    }

    pub(super) async fn require_product<C: ConnectionTrait>(
        &self,
        db: &C,
        product_id: Uuid,
    ) -> ResultEngine<Product> {
        products::Entity::find_by_id(product_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))
            .and_then(Product::try_from)
    }

    /// Load a product the caller may mutate: the caller must be a seller and
    /// the product's owner.
    pub(super) async fn require_owned_product<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        product_id: Uuid,
    ) -> ResultEngine<(Account, Product)> {
        let seller = self
            .require_account_with_role(db, user_id, Role::Seller)
            .await?;
        let product = self.require_product(db, product_id).await?;
        require_owner(&seller, product.seller_id)?;
        Ok((seller, product))
    }
}
