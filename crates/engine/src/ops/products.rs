use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, NewProduct, Product, ProductPatch, ResultEngine, Role, products,
    util::{normalize_required_text, require_positive},
};

use super::Engine;

impl Engine {
    /// List a new product owned by the calling seller.
    pub async fn create_product(&self, user_id: Uuid, new: NewProduct) -> ResultEngine<Product> {
        let product_name = normalize_required_text(&new.product_name, "product name")?;
        let cost = require_positive(new.cost, "cost")?;
        self.require_account_with_role(&self.database, user_id, Role::Seller)
            .await?;

        let product = Product {
            id: Uuid::new_v4(),
            product_name,
            cost,
            seller_id: user_id,
        };
        products::ActiveModel {
            id: ActiveValue::Set(product.id.to_string()),
            product_name: ActiveValue::Set(product.product_name.clone()),
            cost: ActiveValue::Set(product.cost),
            seller_id: ActiveValue::Set(user_id.to_string()),
        }
        .insert(&self.database)
        .await?;

        tracing::info!(product_id = %product.id, seller_id = %user_id, cost, "product created");
        Ok(product)
    }

    pub async fn product(&self, product_id: Uuid) -> ResultEngine<Product> {
        self.require_product(&self.database, product_id).await
    }

    /// Every product, ordered by name.
    pub async fn list_products(&self) -> ResultEngine<Vec<Product>> {
        products::Entity::find()
            .order_by_asc(products::Column::ProductName)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    /// Products listed by one seller.
    pub async fn products_by_seller(&self, seller_id: Uuid) -> ResultEngine<Vec<Product>> {
        products::Entity::find()
            .filter(products::Column::SellerId.eq(seller_id.to_string()))
            .order_by_asc(products::Column::ProductName)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    /// Apply every field set in `patch`.
    ///
    /// Authorization: the calling seller must own the product.
    pub async fn update_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        patch: ProductPatch,
    ) -> ResultEngine<Product> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput(
                "provide at least one of product_name or cost".to_string(),
            ));
        }
        let product_name = patch
            .product_name
            .as_deref()
            .map(|name| normalize_required_text(name, "product name"))
            .transpose()?;
        let cost = patch
            .cost
            .map(|cost| require_positive(cost, "cost"))
            .transpose()?;

        let (_, mut product) = self
            .require_owned_product(&self.database, user_id, product_id)
            .await?;

        let mut active = products::ActiveModel {
            id: ActiveValue::Set(product_id.to_string()),
            ..Default::default()
        };
        if let Some(name) = product_name {
            active.product_name = ActiveValue::Set(name.clone());
            product.product_name = name;
        }
        if let Some(cost) = cost {
            active.cost = ActiveValue::Set(cost);
            product.cost = cost;
        }
        active.update(&self.database).await.map_err(|err| match err {
            DbErr::RecordNotUpdated => {
                EngineError::Persistence("product update failed".to_string())
            }
            other => other.into(),
        })?;

        tracing::info!(%product_id, seller_id = %user_id, "product updated");
        Ok(product)
    }

    /// Authorization: the calling seller must own the product.
    pub async fn delete_product(&self, user_id: Uuid, product_id: Uuid) -> ResultEngine<()> {
        self.require_owned_product(&self.database, user_id, product_id)
            .await?;

        let result = products::Entity::delete_by_id(product_id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Persistence(
                "product delete failed".to_string(),
            ));
        }

        tracing::info!(%product_id, seller_id = %user_id, "product deleted");
        Ok(())
    }
}
