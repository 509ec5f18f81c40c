use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::app_config::{AppConfig, Environment, UpstreamConfig};
use crate::ConfigError;

pub const DEFAULT_PHANTOMBUSTER_BASE_URL: &str = "https://api.phantombuster.com/api/v2/";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load only the upstream API settings from the process environment.
///
/// Needs no database configuration, so upstream inspection works on a
/// machine without `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric upstream setting is invalid.
pub fn load_upstream_config_from_env() -> Result<UpstreamConfig, ConfigError> {
    build_upstream_config(&|key| std::env::var(key))
}

/// `RUST_LOG` fallback directive from `PBDB_LOG_LEVEL`, defaulting to `info`.
#[must_use]
pub fn log_level_from_env() -> String {
    resolve_log_level(&|key| std::env::var(key))
}

fn resolve_log_level<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    lookup("PBDB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

fn parse_var<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(var)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn build_upstream_config<F>(lookup: &F) -> Result<UpstreamConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    Ok(UpstreamConfig {
        api_key: lookup("PHANTOMBUSTER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty()),
        base_url: lookup("PHANTOMBUSTER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_PHANTOMBUSTER_BASE_URL.to_string()),
        request_timeout_secs: parse_var(lookup, "PBDB_API_REQUEST_TIMEOUT_SECS", "30")?,
        max_retries: parse_var(lookup, "PBDB_API_MAX_RETRIES", "3")?,
        retry_backoff_base_ms: parse_var(lookup, "PBDB_API_RETRY_BACKOFF_BASE_MS", "1000")?,
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = resolve_database_url(&lookup)?;
    let env = parse_environment(&or_default("PBDB_ENV", "development"))?;

    let bind_addr: SocketAddr = parse_var(&lookup, "PBDB_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = resolve_log_level(&lookup);
    let upstream = build_upstream_config(&lookup)?;

    let db_max_connections = parse_var(&lookup, "PBDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_var(&lookup, "PBDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_var(&lookup, "PBDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let sync_max_concurrent_containers =
        parse_var::<_, usize>(&lookup, "PBDB_SYNC_MAX_CONCURRENT_CONTAINERS", "4")?.max(1);
    let sync_cron = lookup("PBDB_SYNC_CRON")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        phantombuster_api_key: upstream.api_key,
        phantombuster_base_url: upstream.base_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        api_request_timeout_secs: upstream.request_timeout_secs,
        api_max_retries: upstream.max_retries,
        api_retry_backoff_base_ms: upstream.retry_backoff_base_ms,
        sync_max_concurrent_containers,
        sync_cron,
    })
}

/// Uses `DATABASE_URL` when present, otherwise assembles a URL from the
/// discrete `POSTGRES_*` variables.
fn resolve_database_url<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    if let Ok(url) = lookup("DATABASE_URL") {
        return Ok(url);
    }

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    // Without any POSTGRES_* hint the caller most likely forgot DATABASE_URL.
    let host = lookup("POSTGRES_HOST")
        .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;
    let port = lookup("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    port.parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "POSTGRES_PORT".to_string(),
            reason: e.to_string(),
        })?;
    let name = require("POSTGRES_DB")?;
    let user = require("POSTGRES_USER")?;
    let password = require("POSTGRES_PASSWORD")?;

    Ok(format!(
        "postgres://{}:{}@{host}:{port}/{}",
        utf8_percent_encode(&user, NON_ALPHANUMERIC),
        utf8_percent_encode(&password, NON_ALPHANUMERIC),
        utf8_percent_encode(&name, NON_ALPHANUMERIC),
    ))
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PBDB_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
