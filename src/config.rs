// Settings loaded with the 'config' crate, after an optional .env file

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::recommend::{BUDGET_MULTIPLIER, BudgetPolicy, DAILY_FOOD, TRIP_NIGHTS};

pub const DEFAULT_GEOLOCATION_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server_address: String,
    // Reference dataset JSON; the embedded dataset is used when unset
    pub dataset_path: Option<PathBuf>,
    // Fixed seed for category and fallback draws (tests, demos)
    pub rng_seed: Option<u64>,
    pub geolocation_timeout_ms: u64,
    pub budget: BudgetPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1:3000".to_string(),
            dataset_path: None,
            rng_seed: None,
            geolocation_timeout_ms: DEFAULT_GEOLOCATION_TIMEOUT_MS,
            budget: BudgetPolicy::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("geolocation_timeout_ms", DEFAULT_GEOLOCATION_TIMEOUT_MS as i64)?
            .set_default("budget.trip_nights", i64::from(TRIP_NIGHTS))?
            .set_default("budget.daily_food", DAILY_FOOD)?
            .set_default("budget.multiplier", BUDGET_MULTIPLIER)?
            // Optional config.toml next to the binary
            .add_source(File::with_name("config").required(false))
            // e.g. APP_RNG_SEED, APP_BUDGET__TRIP_NIGHTS
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings: Settings = builder
            .build()?
            .try_deserialize()
            .context("Invalid configuration values")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.geolocation_timeout_ms > 0,
            "geolocation_timeout_ms must be positive"
        );
        self.budget.validate()
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.geolocation_timeout(), Duration::from_secs(10));
        assert_eq!(settings.budget.trip_nights, 5);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let settings = Settings {
            geolocation_timeout_ms: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn deserializes_from_toml() {
        let raw = r#"
            server_address = "0.0.0.0:8080"
            rng_seed = 17
            geolocation_timeout_ms = 2500

            [budget]
            trip_nights = 7
            daily_food = 40.0
            multiplier = 2.0
        "#;
        let settings: Settings = Config::builder()
            .add_source(File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.rng_seed, Some(17));
        assert_eq!(settings.budget.trip_nights, 7);
        assert_eq!(settings.geolocation_timeout(), Duration::from_millis(2500));
        assert!(settings.dataset_path.is_none());
    }
}
