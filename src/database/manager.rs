use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Database ping failed: {0}")]
    Ping(#[source] sqlx::Error),
}

/// Builds and verifies the single process-wide pool for the dialer schema
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connection options. The session zone is only set when an explicit
    /// offset is configured; named zones would need the server's tz tables.
    pub fn connect_options(config: &DatabaseConfig) -> Result<MySqlConnectOptions, DatabaseError> {
        if config.host.is_empty() {
            return Err(DatabaseError::InvalidConfig("DB_HOST is empty".to_string()));
        }
        if config.name.is_empty() {
            return Err(DatabaseError::InvalidConfig("DB_NAME is empty".to_string()));
        }

        let session_zone = match config.session_time_zone.as_deref() {
            None => None,
            Some(raw) => Some(utc_offset(raw).ok_or_else(|| {
                DatabaseError::InvalidConfig(format!(
                    "DB_SESSION_TIME_ZONE must look like +05:30 or -05:00, got '{}'",
                    raw
                ))
            })?),
        };

        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.name)
            .charset("utf8mb4")
            .timezone(session_zone);

        if !config.password.is_empty() {
            options = options.password(&config.password);
        }

        Ok(options)
    }

    pub fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
        MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections.min(config.max_connections))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
    }

    /// Open the pool and ping it. Any failure here is fatal to startup.
    pub async fn connect(config: &DatabaseConfig) -> Result<MySqlPool, DatabaseError> {
        let options = Self::connect_options(config)?;
        let pool = Self::pool_options(config)
            .connect_with(options)
            .await
            .map_err(DatabaseError::Connect)?;

        Self::ping(&pool).await?;

        info!(
            "Connected to database {}@{}:{}/{} (tz {})",
            config.user, config.host, config.port, config.name, config.timezone
        );
        Ok(pool)
    }

    /// Pool that does not open a connection until first use
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<MySqlPool, DatabaseError> {
        let options = Self::connect_options(config)?;
        Ok(Self::pool_options(config).connect_lazy_with(options))
    }

    pub async fn ping(pool: &MySqlPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map_err(DatabaseError::Ping)?;
        Ok(())
    }

    pub async fn close(pool: &MySqlPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}

/// Normalize a `±HH:MM` offset; anything else (including zone names) is rejected
pub fn utc_offset(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let sign = raw.chars().next().filter(|c| *c == '+' || *c == '-')?;
    let (hours, minutes) = raw[1..].split_once(':')?;
    let two_digits = |v: &str| v.len() == 2 && v.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }
    let (h, m): (u8, u8) = (hours.parse().ok()?, minutes.parse().ok()?);
    (h <= 14 && m < 60).then(|| format!("{}{:02}:{:02}", sign, h, m))
}

/// True when the statement referenced a column this schema version lacks.
/// Used to retry with a reduced column list on older dialer installs.
pub fn is_unknown_column(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("42S22") || db_err.message().contains("Unknown column")
        }
        _ => false,
    }
}

pub fn is_no_rows(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::RowNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn rejects_empty_host() {
        let mut config = AppConfig::default().database;
        config.host.clear();
        assert!(matches!(
            DatabaseManager::connect_options(&config),
            Err(DatabaseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn builds_options_from_defaults() {
        let config = AppConfig::default().database;
        assert!(DatabaseManager::connect_options(&config).is_ok());
    }

    #[test]
    fn session_zone_accepts_offsets_only() {
        assert_eq!(utc_offset("-05:00").as_deref(), Some("-05:00"));
        assert_eq!(utc_offset(" +05:30 ").as_deref(), Some("+05:30"));
        assert!(utc_offset("America/New_York").is_none());
        assert!(utc_offset("+5:00").is_none());
        assert!(utc_offset("+15:00").is_none());
        assert!(utc_offset("+05:00'; SET @x='1").is_none());
    }

    #[test]
    fn named_session_zone_is_rejected_before_connecting() {
        let mut config = AppConfig::default().database;
        config.session_time_zone = Some("America/New_York".to_string());
        assert!(matches!(
            DatabaseManager::connect_options(&config),
            Err(DatabaseError::InvalidConfig(_))
        ));

        config.session_time_zone = Some("-05:00".to_string());
        assert!(DatabaseManager::connect_options(&config).is_ok());
    }

    #[test]
    fn classifies_row_not_found() {
        assert!(is_no_rows(&sqlx::Error::RowNotFound));
        assert!(!is_unknown_column(&sqlx::Error::RowNotFound));
    }
}
