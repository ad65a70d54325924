//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` next to the binary,
//! overridden by `COINSLOT__<SECTION>__<KEY>` environment variables
//! (e.g. `COINSLOT__SERVER__PORT=8080`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Vending {
    /// Accepted coin values.
    pub coins: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub session_ttl_hours: i64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub vending: Vending,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 7000)?
            .set_default("server.database", "memory")?
            .set_default("vending.coins", engine::DEFAULT_COINS.to_vec())?
            .set_default("auth.session_ttl_hours", 24)?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("COINSLOT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("vending.coins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
