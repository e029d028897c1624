use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from the variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn invalid(var: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

fn parsed<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| invalid(var, e))
}

/// Build configuration from an arbitrary lookup so tests can feed a plain
/// `HashMap` instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_or = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.trim().is_empty() {
            return Err(invalid(var, "value must not be empty"));
        }
        Ok(raw)
    };

    let env = parse_environment(&or_default("TRENDSCOUT_ENV", "development"));

    let bind_addr: SocketAddr = parsed(
        "TRENDSCOUT_BIND_ADDR",
        &or_default("TRENDSCOUT_BIND_ADDR", "0.0.0.0:4000"),
    )?;
    let log_level = or_default("TRENDSCOUT_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "TRENDSCOUT_SOURCES_PATH",
        "./config/sources.yaml",
    ));
    let artifact_dir = lookup("TRENDSCOUT_ARTIFACT_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    let run_schedule = parse_or("TRENDSCOUT_RUN_SCHEDULE", "0 0 */6 * * *")?;
    let run_on_start = parse_bool(
        "TRENDSCOUT_RUN_ON_START",
        &or_default("TRENDSCOUT_RUN_ON_START", "true"),
    )?;
    let indexed_scoring_threshold: usize = parsed(
        "TRENDSCOUT_INDEXED_SCORING_THRESHOLD",
        &or_default("TRENDSCOUT_INDEXED_SCORING_THRESHOLD", "500"),
    )?;

    let scraper_request_timeout_secs: u64 = parsed(
        "TRENDSCOUT_SCRAPER_REQUEST_TIMEOUT_SECS",
        &or_default("TRENDSCOUT_SCRAPER_REQUEST_TIMEOUT_SECS", "30"),
    )?;
    let scraper_user_agent = parse_or(
        "TRENDSCOUT_SCRAPER_USER_AGENT",
        "trendscout/0.1 (trend-research)",
    )?;
    let scraper_inter_request_delay_ms: u64 = parsed(
        "TRENDSCOUT_SCRAPER_INTER_REQUEST_DELAY_MS",
        &or_default("TRENDSCOUT_SCRAPER_INTER_REQUEST_DELAY_MS", "250"),
    )?;
    let scraper_max_retries: u32 = parsed(
        "TRENDSCOUT_SCRAPER_MAX_RETRIES",
        &or_default("TRENDSCOUT_SCRAPER_MAX_RETRIES", "3"),
    )?;
    let scraper_retry_backoff_base_secs: u64 = parsed(
        "TRENDSCOUT_SCRAPER_RETRY_BACKOFF_BASE_SECS",
        &or_default("TRENDSCOUT_SCRAPER_RETRY_BACKOFF_BASE_SECS", "5"),
    )?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        sources_path,
        artifact_dir,
        run_schedule,
        run_on_start,
        indexed_scoring_threshold,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
