//! Account, login and session endpoints.

use api_types::user::{
    Login, LoginResponse, SessionsRevoked, UserCreated, UserNew, UserUpdate, UserView,
};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use engine::{Account, AccountPatch, NewAccount};

use crate::{ServerError, server::AuthSession, server::ServerState};

fn map_role(role: engine::Role) -> api_types::Role {
    match role {
        engine::Role::Buyer => api_types::Role::Buyer,
        engine::Role::Seller => api_types::Role::Seller,
    }
}

fn unmap_role(role: api_types::Role) -> engine::Role {
    match role {
        api_types::Role::Buyer => engine::Role::Buyer,
        api_types::Role::Seller => engine::Role::Seller,
    }
}

fn user_view(account: Account) -> UserView {
    UserView {
        id: account.id,
        email: account.email,
        user_name: account.username,
        full_name: account.full_name,
        phone: account.phone,
        role: map_role(account.role),
        deposit: account.deposit,
        is_verified: account.is_verified,
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

pub async fn register(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<UserNew>, ServerError>,
) -> Result<(StatusCode, Json<UserCreated>), ServerError> {
    let new = NewAccount {
        email: payload.email,
        password: payload.password,
        full_name: payload.full_name,
        phone: payload.phone,
        role: payload.role.map(unmap_role),
    };
    let account = state.engine.register(new).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            user_id: account.id,
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<Login>, ServerError>,
) -> Result<Json<LoginResponse>, ServerError> {
    let account = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    let other_sessions_active = state.engine.active_sessions(account.id).await? > 0;
    let session = state.engine.issue_session(account.id).await?;

    tracing::info!(user_id = %account.id, other_sessions_active, "login");
    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        other_sessions_active,
    }))
}

pub async fn get(session: AuthSession) -> Json<UserView> {
    Json(user_view(session.account))
}

pub async fn update(
    session: AuthSession,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<UserUpdate>, ServerError>,
) -> Result<Json<UserView>, ServerError> {
    let patch = AccountPatch {
        full_name: payload.full_name,
        phone: payload.phone,
        role: payload.role.map(unmap_role),
    };
    let account = state
        .engine
        .update_account(session.account.id, patch)
        .await?;
    Ok(Json(user_view(account)))
}

pub async fn delete(
    session: AuthSession,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(session.account.id).await?;
    Ok(StatusCode::OK)
}

/// Reaching the handler means the extractor accepted the token.
pub async fn verify_token(_: AuthSession) -> StatusCode {
    StatusCode::OK
}

pub async fn logout(
    session: AuthSession,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.revoke_session(&session.token).await?;
    Ok(StatusCode::OK)
}

pub async fn logout_all(
    session: AuthSession,
    State(state): State<ServerState>,
) -> Result<Json<SessionsRevoked>, ServerError> {
    let revoked = state
        .engine
        .revoke_all_sessions(session.account.id)
        .await?;
    Ok(Json(SessionsRevoked { revoked }))
}
