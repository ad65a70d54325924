//! Product catalogue endpoints.
//!
//! Reads are open to any authenticated account; writes are for the seller
//! owning the product.

use api_types::product::{ProductCreated, ProductNew, ProductUpdate, ProductView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{NewProduct, Product, ProductPatch};
use uuid::Uuid;

use crate::{ServerError, server::AuthSession, server::ServerState};

fn product_view(product: Product) -> ProductView {
    ProductView {
        id: product.id,
        product_name: product.product_name,
        cost: product.cost,
        seller_id: product.seller_id,
    }
}

pub async fn create(
    session: AuthSession,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<ProductNew>, ServerError>,
) -> Result<(StatusCode, Json<ProductCreated>), ServerError> {
    let product = state
        .engine
        .create_product(
            session.account.id,
            NewProduct::new(payload.product_name, payload.cost),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductCreated {
            product_id: product.id,
        }),
    ))
}

pub async fn list(
    _: AuthSession,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ProductView>>, ServerError> {
    let products = state.engine.list_products().await?;
    Ok(Json(products.into_iter().map(product_view).collect()))
}

pub async fn get(
    _: AuthSession,
    State(state): State<ServerState>,
    WithRejection(Path(product_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<ProductView>, ServerError> {
    let product = state.engine.product(product_id).await?;
    Ok(Json(product_view(product)))
}

pub async fn update(
    session: AuthSession,
    State(state): State<ServerState>,
    WithRejection(Path(product_id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<ProductUpdate>, ServerError>,
) -> Result<Json<ProductView>, ServerError> {
    let patch = ProductPatch {
        product_name: payload.product_name,
        cost: payload.cost,
    };
    let product = state
        .engine
        .update_product(session.account.id, product_id, patch)
        .await?;
    Ok(Json(product_view(product)))
}

pub async fn delete(
    session: AuthSession,
    State(state): State<ServerState>,
    WithRejection(Path(product_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_product(session.account.id, product_id)
        .await?;
    Ok(StatusCode::OK)
}
