use anyhow::Result;
use chrono::Duration;
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use sea_orm::Database;
use serde::Deserialize;

use crate::auth::JwtService;
use crate::schemas::AppState;

/// Signing secret used when none is configured. Fine for local development only.
pub const DEV_JWT_SECRET: &str = "pizzeria-development-secret-change-me";

/// Runtime settings, layered as defaults, then `pizzeria.toml`, then `PIZZERIA_*` env vars.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    /// Lifetime of access tokens in seconds
    pub access_token_ttl_secs: i64,
    /// Lifetime of refresh tokens in seconds
    pub refresh_token_ttl_secs: i64,
}

impl Settings {
    /// Load settings from `.env`, the optional config file and the environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = defaults()?
            .add_source(File::with_name("pizzeria").required(false))
            .add_source(Environment::with_prefix("PIZZERIA").try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;

        if settings.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("Using the built-in development JWT secret; set PIZZERIA_JWT_SECRET");
        }

        Ok(settings)
    }

    /// Replace values with CLI overrides where given
    pub fn with_overrides(mut self, database_url: Option<String>, bind_address: Option<String>) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        self
    }

    pub fn jwt_service(&self) -> JwtService {
        JwtService::new(
            &self.jwt_secret,
            Duration::seconds(self.access_token_ttl_secs),
            Duration::seconds(self.refresh_token_ttl_secs),
        )
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    let builder = Config::builder()
        .set_default("database_url", "sqlite://pizzeria.db?mode=rwc")?
        .set_default("bind_address", "0.0.0.0:3000")?
        .set_default("jwt_secret", DEV_JWT_SECRET)?
        .set_default("access_token_ttl_secs", 15_i64 * 60)?
        .set_default("refresh_token_ttl_secs", 30_i64 * 24 * 60 * 60)?;
    Ok(builder)
}

/// Initialize application state from the given settings
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;

    Ok(AppState {
        db,
        jwt: settings.jwt_service(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();

        assert_eq!(settings.database_url, "sqlite://pizzeria.db?mode=rwc");
        assert_eq!(settings.bind_address, "0.0.0.0:3000");
        assert_eq!(settings.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(settings.access_token_ttl_secs, 900);
        assert_eq!(settings.refresh_token_ttl_secs, 2_592_000);
    }

    #[test]
    fn test_cli_overrides() {
        let settings = defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap()
            .with_overrides(Some("sqlite::memory:".to_string()), None);

        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.bind_address, "0.0.0.0:3000");
    }
}
