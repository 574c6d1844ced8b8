//! Server configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crisis_core::policy::ScoreBounds;

use crate::error::AppError;
use crate::state::GameSettings;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Pool size.
    pub max_connections: u32,
    /// Gameplay settings.
    pub settings: GameSettings,
    /// Base for scenario media URIs; `None` serves no media.
    pub media_base_url: Option<String>,
    /// Scenario pack imported at startup.
    pub seed_pack_path: Option<PathBuf>,
    /// OTLP collector endpoint; `None` disables span export.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or a value
    /// fails to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| AppError::Config("DATABASE_URL environment variable must be set".into()))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 3000)?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;

        let floor = parse_opt(&lookup, "SCORE_FLOOR")?;
        let ceiling = parse_opt(&lookup, "SCORE_CEILING")?;
        let bounds =
            ScoreBounds::new(floor, ceiling).map_err(|e| AppError::Config(e.to_string()))?;
        let min_choices = parse_or(&lookup, "MIN_CHOICES_PER_SCENARIO", 2)?;
        let idle_secs = parse_or(&lookup, "SESSION_IDLE_TIMEOUT_SECS", 30 * 60)?;
        if idle_secs == 0 {
            return Err(AppError::Config(
                "SESSION_IDLE_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }

        let media_base_url = match lookup("MEDIA_BASE_URL") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(value),
            None => Some("/media".to_string()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            settings: GameSettings {
                bounds,
                min_choices,
                session_idle_timeout: Duration::from_secs(idle_secs),
            },
            media_base_url,
            seed_pack_path: lookup("SEED_PACK_PATH").map(PathBuf::from),
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty()),
        })
    }
}

fn parse_opt<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}")))
        })
        .transpose()
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}
