use sea_orm::Database;

use engine::{EngineError, Engine, NewAccount, NewProduct, ProductPatch, Role};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn account(engine: &Engine, email: &str, role: Role) -> Uuid {
    engine
        .register(NewAccount::new(email, "secret").role(role))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn seller_creates_and_reads_product() {
    let engine = engine_with_db().await;
    let seller = account(&engine, "seller@example.com", Role::Seller).await;

    let product = engine
        .create_product(seller, NewProduct::new("  Cola ", 50))
        .await
        .unwrap();
    assert_eq!(product.product_name, "Cola");
    assert_eq!(product.cost, 50);
    assert_eq!(product.seller_id, seller);

    assert_eq!(engine.product(product.id).await.unwrap(), product);
}

#[tokio::test]
async fn buyers_cannot_create_products() {
    let engine = engine_with_db().await;
    let buyer = account(&engine, "buyer@example.com", Role::Buyer).await;

    assert!(matches!(
        engine.create_product(buyer, NewProduct::new("Cola", 50)).await,
        Err(EngineError::Unauthorized(_))
    ));
    assert!(engine.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_product_validates_fields() {
    let engine = engine_with_db().await;
    let seller = account(&engine, "seller@example.com", Role::Seller).await;

    assert!(matches!(
        engine.create_product(seller, NewProduct::new("Cola", 0)).await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine.create_product(seller, NewProduct::new("   ", 50)).await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn listing_is_ordered_by_name_and_filterable_by_seller() {
    let engine = engine_with_db().await;
    let first = account(&engine, "first@example.com", Role::Seller).await;
    let second = account(&engine, "second@example.com", Role::Seller).await;

    engine
        .create_product(first, NewProduct::new("Water", 10))
        .await
        .unwrap();
    engine
        .create_product(second, NewProduct::new("Chips", 20))
        .await
        .unwrap();
    engine
        .create_product(first, NewProduct::new("Apple", 30))
        .await
        .unwrap();

    let names: Vec<_> = engine
        .list_products()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.product_name)
        .collect();
    assert_eq!(names, ["Apple", "Chips", "Water"]);

    let own = engine.products_by_seller(first).await.unwrap();
    assert_eq!(own.len(), 2);
    assert!(own.iter().all(|p| p.seller_id == first));
}

#[tokio::test]
async fn owner_updates_product_fields() {
    let engine = engine_with_db().await;
    let seller = account(&engine, "seller@example.com", Role::Seller).await;
    let product = engine
        .create_product(seller, NewProduct::new("Cola", 50))
        .await
        .unwrap();

    let patch = ProductPatch {
        product_name: Some("Cola Zero".to_string()),
        cost: Some(55),
    };
    let updated = engine
        .update_product(seller, product.id, patch)
        .await
        .unwrap();
    assert_eq!(updated.product_name, "Cola Zero");
    assert_eq!(updated.cost, 55);

    let cost_only = ProductPatch {
        cost: Some(60),
        ..Default::default()
    };
    engine
        .update_product(seller, product.id, cost_only)
        .await
        .unwrap();
    let stored = engine.product(product.id).await.unwrap();
    assert_eq!(stored.product_name, "Cola Zero");
    assert_eq!(stored.cost, 60);
}

#[tokio::test]
async fn empty_or_invalid_patch_is_rejected() {
    let engine = engine_with_db().await;
    let seller = account(&engine, "seller@example.com", Role::Seller).await;
    let product = engine
        .create_product(seller, NewProduct::new("Cola", 50))
        .await
        .unwrap();

    assert!(matches!(
        engine
            .update_product(seller, product.id, ProductPatch::default())
            .await,
        Err(EngineError::InvalidInput(_))
    ));
    let negative = ProductPatch {
        cost: Some(-1),
        ..Default::default()
    };
    assert!(matches!(
        engine.update_product(seller, product.id, negative).await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert_eq!(engine.product(product.id).await.unwrap().cost, 50);
}

#[tokio::test]
async fn non_owner_cannot_touch_product() {
    let engine = engine_with_db().await;
    let owner = account(&engine, "owner@example.com", Role::Seller).await;
    let other = account(&engine, "other@example.com", Role::Seller).await;
    let product = engine
        .create_product(owner, NewProduct::new("Cola", 50))
        .await
        .unwrap();

    let patch = ProductPatch {
        cost: Some(1),
        ..Default::default()
    };
    assert_eq!(
        engine.update_product(other, product.id, patch).await,
        Err(EngineError::Forbidden(
            "user does not own this product".to_string()
        ))
    );
    assert!(matches!(
        engine.delete_product(other, product.id).await,
        Err(EngineError::Forbidden(_))
    ));

    assert_eq!(engine.product(product.id).await.unwrap(), product);
}

#[tokio::test]
async fn buyer_cannot_delete_product() {
    let engine = engine_with_db().await;
    let seller = account(&engine, "seller@example.com", Role::Seller).await;
    let buyer = account(&engine, "buyer@example.com", Role::Buyer).await;
    let product = engine
        .create_product(seller, NewProduct::new("Cola", 50))
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_product(buyer, product.id).await,
        Err(EngineError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn owner_deletes_product() {
    let engine = engine_with_db().await;
    let seller = account(&engine, "seller@example.com", Role::Seller).await;
    let product = engine
        .create_product(seller, NewProduct::new("Cola", 50))
        .await
        .unwrap();

    engine.delete_product(seller, product.id).await.unwrap();
    assert!(matches!(
        engine.product(product.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_product(seller, product.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
