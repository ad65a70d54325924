use chrono::Duration;
use sea_orm::DatabaseConnection;

use crate::{Denominations, EngineError, ResultEngine};

mod access;
mod accounts;
mod balances;
mod products;
mod purchases;
mod sessions;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Entry point to every vending operation.
///
/// The engine holds no balances in memory: each call reads and writes the
/// injected database, so one `Engine` can be shared across requests.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    denominations: Denominations,
    session_ttl: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Coins accepted by [`Engine::deposit`].
    pub fn denominations(&self) -> &Denominations {
        &self.denominations
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    denominations: Option<Denominations>,
    session_ttl_hours: Option<i64>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Coins accepted for deposits. Defaults to 5, 10, 20, 50 and 100.
    pub fn denominations(mut self, denominations: Denominations) -> EngineBuilder {
        self.denominations = Some(denominations);
        self
    }

    /// Lifetime of login sessions. Defaults to 24 hours.
    pub fn session_ttl_hours(mut self, hours: i64) -> EngineBuilder {
        self.session_ttl_hours = Some(hours);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let hours = self.session_ttl_hours.unwrap_or(DEFAULT_SESSION_TTL_HOURS);
        if hours <= 0 {
            return Err(EngineError::InvalidInput(
                "session ttl must be > 0 hours".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            denominations: self.denominations.unwrap_or_default(),
            session_ttl: Duration::hours(hours),
        })
    }
}
