//! Vending machine core.
//!
//! Buyers deposit coins and buy products; sellers list and maintain the
//! products they own. Every balance change is a single row update that can
//! never drive an account below zero.

pub use coins::{DEFAULT_COINS, Denominations, is_valid_denomination};
pub use commands::{AccountPatch, BuyCmd, NewAccount, NewProduct, ProductPatch};
pub use error::EngineError;
pub use ops::{Engine, EngineBuilder};
pub use products::Product;
pub use receipt::Receipt;
pub use roles::{Role, require_owner, require_role};
pub use sessions::SessionToken;
pub use users::Account;

mod coins;
mod commands;
mod error;
mod ops;
mod password;
mod products;
mod receipt;
mod roles;
mod sessions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
