//! Runtime configuration read from the environment.

use crate::error::ConfigError;
use crate::expiry::{Clock, FixedClock, SystemClock};
use crate::money::Money;
use crate::recorder::{CsvFileStore, MemoryStore, StatusStore};
use crate::validation::DEFAULT_MAX_YEARS_AHEAD;
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Reference date override (`YYYY-MM-DD`).
pub const ENV_TODAY: &str = "CARD_GATE_TODAY";
/// Path of the CSV status store. Unset means in-memory.
pub const ENV_STORE: &str = "CARD_GATE_STORE";
/// Purchase amount recorded with every settled transaction.
pub const ENV_PRICE: &str = "CARD_GATE_PRICE";
/// How many years ahead an expiry year may lie.
pub const ENV_MAX_YEARS: &str = "CARD_GATE_MAX_YEARS";

/// Default purchase amount (45 000.00).
pub const DEFAULT_PRICE_MINOR: i64 = 4_500_000;

/// Settings of one engine instance.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Fixed reference date; `None` follows the system clock.
    pub today: Option<NaiveDate>,
    pub store_path: Option<PathBuf>,
    pub price: Money,
    pub max_years_ahead: u8,
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            today: None,
            store_path: None,
            price: Money::from_minor(DEFAULT_PRICE_MINOR),
            max_years_ahead: DEFAULT_MAX_YEARS_AHEAD,
        }
    }
}

impl GateConfig {
    /// Reads the configuration from `CARD_GATE_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GateConfig::default();
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let today = var(ENV_TODAY)
            .map(|value| {
                NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                    ConfigError::InvalidValue {
                        name: ENV_TODAY,
                        value,
                        expected: "a date formatted YYYY-MM-DD",
                    }
                })
            })
            .transpose()?;

        let price = match var(ENV_PRICE) {
            Some(value) => match Money::from_str(&value) {
                Ok(price) if !price.is_negative() => price,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: ENV_PRICE,
                        value,
                        expected: "a non-negative decimal amount",
                    })
                }
            },
            None => defaults.price,
        };

        let max_years_ahead = match var(ENV_MAX_YEARS) {
            Some(value) => value
                .trim()
                .parse::<u8>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: ENV_MAX_YEARS,
                    value,
                    expected: "a whole number of years between 0 and 99",
                })
                .and_then(|years| {
                    if years <= 99 {
                        Ok(years)
                    } else {
                        Err(ConfigError::InvalidValue {
                            name: ENV_MAX_YEARS,
                            value: years.to_string(),
                            expected: "a whole number of years between 0 and 99",
                        })
                    }
                })?,
            None => defaults.max_years_ahead,
        };

        Ok(GateConfig {
            today,
            store_path: var(ENV_STORE).map(PathBuf::from),
            price,
            max_years_ahead,
        })
    }

    /// The clock selected by this configuration.
    pub fn clock(&self) -> Box<dyn Clock> {
        match self.today {
            Some(date) => Box::new(FixedClock::at_date(date)),
            None => Box::new(SystemClock),
        }
    }

    /// The status store selected by this configuration.
    pub fn store(&self) -> Box<dyn StatusStore> {
        match &self.store_path {
            Some(path) => Box::new(CsvFileStore::new(path.clone())),
            None => Box::new(MemoryStore::new()),
        }
    }
}
