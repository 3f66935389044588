//! Server settings, layered from defaults, an optional `config.toml` and the
//! environment (`DATABASE_URL`, `DATABASE_PASSWORD`, …).
//!
//! The store address and its credential have no default: starting without either is
//! a fatal configuration error.

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

#[derive(Debug, Deserialize)]
pub struct Database {
    /// Network address of the store, e.g. `postgres://db.internal:5432/pixelplus`.
    pub url: String,
    /// Access credential. Kept apart from the URL so it can come from a secret.
    pub password: String,
    /// Maximum pooled connections.
    pub pool: u32,
}

impl Database {
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        Ok(self
            .url
            .parse::<PgConnectOptions>()?
            .password(&self.password))
    }
}

#[derive(Debug, Deserialize)]
pub struct Feed {
    /// Seconds a live-feed poll waits for new rows before returning empty.
    pub wait: u64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub feed: Feed,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("database.pool", 5)?
            .set_default("feed.wait", 25)?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(env_section("DATABASE"))
            .add_source(env_section("FEED"))
            .build()?;

        config.try_deserialize()
    }
}

/// `<PREFIX>_<KEY>` variables, mapped to `<prefix>.<key>`.
fn env_section(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator("_")
        .keep_prefix(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::{remove_var, set_var};

    // Environment variables are process-wide, so every case lives in one test.
    #[test]
    fn test_settings() {
        remove_var("DATABASE_URL");
        remove_var("DATABASE_PASSWORD");
        assert!(Settings::load().is_err());

        set_var("DATABASE_URL", "postgres://localhost:5432/pixelplus");
        assert!(Settings::load().is_err());

        set_var("DATABASE_PASSWORD", "hunter2");
        set_var("FEED_WAIT", "5");
        let settings = Settings::load().unwrap();
        assert_eq!(settings.database.url, "postgres://localhost:5432/pixelplus");
        assert_eq!(settings.database.password, "hunter2");
        assert_eq!(settings.database.pool, 5);
        assert_eq!(settings.feed.wait, 5);
        assert!(settings.database.connect_options().is_ok());

        remove_var("FEED_WAIT");
        remove_var("DATABASE_URL");
        remove_var("DATABASE_PASSWORD");
    }
}
