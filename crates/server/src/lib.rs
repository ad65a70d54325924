use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use api_types::ErrorBody;
pub use server::{router, run_with_listener};

mod products;
mod server;
mod user;
mod vending;

pub mod types {
    pub mod user {
        pub use api_types::user::{
            Login, LoginResponse, SessionsRevoked, UserCreated, UserNew, UserUpdate, UserView,
        };
    }

    pub mod product {
        pub use api_types::product::{ProductCreated, ProductNew, ProductUpdate, ProductView};
    }

    pub mod vending {
        pub use api_types::vending::{BalanceView, BuyRequest, BuyResponse, DepositRequest};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Missing, unknown or expired bearer token.
    Unauthenticated(String),
    /// Malformed request: unreadable JSON body or path parameter.
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthorized(_) | EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Persistence(_)
        | EngineError::PasswordHash(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidRole(_)
        | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InsufficientFunds(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Stable failure kind, so callers can tell apart errors sharing a status.
fn kind_for_engine_error(err: &EngineError) -> &'static str {
    match err {
        EngineError::InvalidAmount(_) | EngineError::InvalidInput(_) => "validation",
        EngineError::Unauthorized(_) => "authorization",
        EngineError::Forbidden(_) => "ownership",
        EngineError::InvalidCredentials(_) => "unauthenticated",
        EngineError::KeyNotFound(_) => "not_found",
        EngineError::ExistingKey(_) => "conflict",
        EngineError::InsufficientFunds(_) => "insufficient_funds",
        EngineError::Persistence(_) => "persistence",
        EngineError::PasswordHash(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidRole(_)
        | EngineError::Database(_) => "internal",
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        err @ (EngineError::PasswordHash(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidRole(_)) => {
            tracing::error!("corrupted state: {err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, error) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                kind_for_engine_error(&err),
                message_for_engine_error(err),
            ),
            ServerError::Unauthenticated(err) => (StatusCode::UNAUTHORIZED, "unauthenticated", err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, "bad_request", err),
        };

        (
            status,
            Json(ErrorBody {
                error,
                kind: kind.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
