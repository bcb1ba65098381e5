use anyhow::{Context, Result};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// First competition start date that counts for ratings.
    pub rating_epoch: NaiveDate,
    /// Seconds between background rating sweeps; 0 turns them off.
    pub rating_sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            rating_epoch: match std::env::var("RATING_EPOCH") {
                Ok(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .context("RATING_EPOCH must be a YYYY-MM-DD date")?,
                Err(_) => NaiveDate::from_ymd_opt(2024, 1, 1).context("Invalid default epoch")?,
            },
            rating_sweep_interval_secs: match std::env::var("RATING_SWEEP_INTERVAL_SECS") {
                Ok(value) => value
                    .parse()
                    .context("RATING_SWEEP_INTERVAL_SECS must be a number")?,
                Err(_) => 300,
            },
        })
    }
}
