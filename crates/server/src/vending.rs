//! Deposit, reset and buy: the buyer side of the machine.

use api_types::vending::{BalanceView, BuyRequest, BuyResponse, DepositRequest};
use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use engine::BuyCmd;

use crate::{ServerError, server::AuthSession, server::ServerState};

pub async fn deposit(
    session: AuthSession,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<DepositRequest>, ServerError>,
) -> Result<Json<BalanceView>, ServerError> {
    let deposit = state
        .engine
        .deposit(session.account.id, payload.amount)
        .await?;
    Ok(Json(BalanceView { deposit }))
}

pub async fn reset(
    session: AuthSession,
    State(state): State<ServerState>,
) -> Result<Json<BalanceView>, ServerError> {
    state.engine.reset_deposit(session.account.id).await?;
    Ok(Json(BalanceView { deposit: 0 }))
}

pub async fn buy(
    session: AuthSession,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<BuyRequest>, ServerError>,
) -> Result<Json<BuyResponse>, ServerError> {
    let receipt = state
        .engine
        .buy(BuyCmd::new(
            session.account.id,
            payload.product_id,
            payload.quantity,
        ))
        .await?;

    Ok(Json(BuyResponse {
        product_id: receipt.product_id,
        quantity_purchased: receipt.quantity_purchased,
        amount_spent: receipt.amount_spent,
        change: receipt.change,
    }))
}
