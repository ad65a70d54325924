use axum::{
    Router,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{ServerError, products, user, vending};
use engine::{Account, Engine};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// The authenticated caller.
///
/// Extracting it requires `Authorization: Bearer <token>` with a live
/// session; handlers that take it are the protected routes.
#[derive(Clone, Debug)]
pub struct AuthSession {
    pub account: Account,
    pub token: String,
}

impl FromRequestParts<ServerState> for AuthSession {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ServerError::Unauthenticated("token invalid".to_string()))?;
        let token = bearer.token().to_string();

        let account = state
            .engine
            .resolve_principal(&token)
            .await
            .map_err(|err| {
                tracing::debug!("rejected bearer token: {err}");
                match err {
                    engine::EngineError::InvalidCredentials(msg) => {
                        ServerError::Unauthenticated(msg)
                    }
                    other => ServerError::Engine(other),
                }
            })?;

        Ok(AuthSession { account, token })
    }
}

async fn version() -> String {
    format!("coinslot - Version {}\n", env!("CARGO_PKG_VERSION"))
}

/// Build the application router around a shared engine.
pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };

    Router::new()
        .route("/", get(version))
        .route(
            "/v1/user",
            post(user::register)
                .get(user::get)
                .put(user::update)
                .delete(user::delete),
        )
        .route("/v1/login", post(user::login))
        .route("/v1/verify-token", post(user::verify_token))
        .route("/v1/logout", post(user::logout))
        .route("/v1/logout/all", post(user::logout_all))
        .route(
            "/v1/products",
            post(products::create).get(products::list),
        )
        .route(
            "/v1/products/{product_id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/v1/deposit", post(vending::deposit))
        .route("/v1/buy", post(vending::buy))
        .route("/v1/reset", post(vending::reset))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}
