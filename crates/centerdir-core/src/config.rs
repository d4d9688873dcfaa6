use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Largest `limit` a nearest-center query will honour.
pub const MAX_NEAREST_LIMIT: usize = 100;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let dataset = or_default("CENTERDIR_DATASET", "./data/centers.json");
    if dataset.trim().is_empty() {
        return Err(invalid("CENTERDIR_DATASET", "must not be empty".to_string()));
    }

    let env = parse_environment(&or_default("CENTERDIR_ENV", "development"))?;

    let bind_addr = or_default("CENTERDIR_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("CENTERDIR_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("CENTERDIR_LOG_LEVEL", "info");

    let fetch_timeout_secs = parse_u64("CENTERDIR_FETCH_TIMEOUT_SECS", "30")?;
    let fetch_user_agent = or_default(
        "CENTERDIR_FETCH_USER_AGENT",
        "centerdir/0.1 (center-directory)",
    );
    let fetch_max_retries = parse_u32("CENTERDIR_FETCH_MAX_RETRIES", "3")?;
    let fetch_retry_backoff_ms = parse_u64("CENTERDIR_FETCH_RETRY_BACKOFF_MS", "1000")?;

    let nearest_default_limit = parse_usize("CENTERDIR_NEAREST_DEFAULT_LIMIT", "10")?;
    if nearest_default_limit == 0 || nearest_default_limit > MAX_NEAREST_LIMIT {
        return Err(invalid(
            "CENTERDIR_NEAREST_DEFAULT_LIMIT",
            format!("must be between 1 and {MAX_NEAREST_LIMIT}, got {nearest_default_limit}"),
        ));
    }

    let nearest_max_distance_km = match lookup("CENTERDIR_NEAREST_MAX_DISTANCE_KM") {
        Ok(raw) => {
            let km = raw
                .parse::<f64>()
                .map_err(|e| invalid("CENTERDIR_NEAREST_MAX_DISTANCE_KM", e.to_string()))?;
            if !km.is_finite() || km <= 0.0 {
                return Err(invalid(
                    "CENTERDIR_NEAREST_MAX_DISTANCE_KM",
                    format!("must be a positive number of kilometers, got {raw}"),
                ));
            }
            Some(km)
        }
        Err(_) => None,
    };

    let rate_limit_per_minute = parse_usize("CENTERDIR_RATE_LIMIT_PER_MINUTE", "120")?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "CENTERDIR_RATE_LIMIT_PER_MINUTE",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        dataset,
        env,
        bind_addr,
        log_level,
        fetch_timeout_secs,
        fetch_user_agent,
        fetch_max_retries,
        fetch_retry_backoff_ms,
        nearest_default_limit,
        nearest_max_distance_km,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`, so a typo never silently
/// downgrades a production deployment.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CENTERDIR_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
