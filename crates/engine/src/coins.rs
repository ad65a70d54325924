//! Coin denominations accepted by the machine.
//!
//! Deposits must be exactly one coin from the configured set: no multiples
//! and no combinations.

use std::{collections::BTreeSet, fmt};

use crate::{EngineError, ResultEngine};

/// Coins accepted when no configuration is supplied.
pub const DEFAULT_COINS: [i64; 5] = [5, 10, 20, 50, 100];

/// Returns `true` iff `amount` is exactly one of the `allowed` coins.
pub fn is_valid_denomination(amount: i64, allowed: &BTreeSet<i64>) -> bool {
    allowed.contains(&amount)
}

/// The ordered set of coins a deployment accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Denominations(BTreeSet<i64>);

impl Denominations {
    /// Build a set from configured values.
    ///
    /// Duplicates collapse; an empty set or a coin `<= 0` is rejected.
    pub fn new(coins: impl IntoIterator<Item = i64>) -> ResultEngine<Self> {
        let coins: BTreeSet<i64> = coins.into_iter().collect();
        if coins.is_empty() {
            return Err(EngineError::InvalidAmount(
                "at least one coin denomination is required".to_string(),
            ));
        }
        if let Some(coin) = coins.iter().find(|coin| **coin <= 0) {
            return Err(EngineError::InvalidAmount(format!(
                "coin denomination must be > 0, got {coin}"
            )));
        }
        Ok(Self(coins))
    }

    pub fn contains(&self, amount: i64) -> bool {
        is_valid_denomination(amount, &self.0)
    }

    /// Reject `amount` unless it is an accepted coin, listing the accepted ones.
    pub fn check(&self, amount: i64) -> ResultEngine<()> {
        if self.contains(amount) {
            return Ok(());
        }
        Err(EngineError::InvalidAmount(format!(
            "you can only deposit {self} coins"
        )))
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl Default for Denominations {
    fn default() -> Self {
        Self(DEFAULT_COINS.into_iter().collect())
    }
}

impl fmt::Display for Denominations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for coin in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{coin}")?;
            first = false;
        }
        Ok(())
    }
}
