use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, AvailabilityPolicy, DedupKey, FeedSourceConfig};
use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.dropshipping.ua/api/feeds";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; promfeed/0.1)";
pub const DEFAULT_CHUNK_SIZE: usize = 20_000;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any value is present but invalid.
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
/// Returns `ConfigError` if any value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

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

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let log_level = or_default("PROMFEED_LOG_LEVEL", "info");
    let feeds_path = PathBuf::from(or_default("PROMFEED_FEEDS_PATH", "./config/feeds.yaml"));
    let feed_ids = optional("PROMFEED_FEED_IDS").map(|raw| split_list(&raw));

    let feed_source = match optional("PROMFEED_FEED_DIR") {
        Some(dir) => FeedSourceConfig::Local {
            dir: PathBuf::from(dir),
        },
        None => FeedSourceConfig::Remote {
            base_url: or_default("PROMFEED_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        },
    };
    let cache_dir = optional("PROMFEED_CACHE_DIR").map(PathBuf::from);

    let output_dir = PathBuf::from(or_default("PROMFEED_OUTPUT_DIR", "."));
    let output_prefix = or_default("PROMFEED_OUTPUT_PREFIX", "b2b.prom");
    let output_files = optional("PROMFEED_OUTPUT_FILES").map(|raw| split_list(&raw));
    let chunk_size =
        parse_positive_usize("PROMFEED_CHUNK_SIZE", &DEFAULT_CHUNK_SIZE.to_string())?;

    let availability_policy =
        AvailabilityPolicy::from_str(&or_default("PROMFEED_AVAILABILITY_POLICY", "require-true"))
            .map_err(|reason| invalid("PROMFEED_AVAILABILITY_POLICY", reason))?;
    let dedup_key = DedupKey::from_str(&or_default("PROMFEED_DEDUP_KEY", "vendor-code"))
        .map_err(|reason| invalid("PROMFEED_DEDUP_KEY", reason))?;
    let emit_empty = parse_bool(&or_default("PROMFEED_EMIT_EMPTY", "false"))
        .map_err(|reason| invalid("PROMFEED_EMIT_EMPTY", reason))?;

    let request_timeout_secs = parse_u64("PROMFEED_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("PROMFEED_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("PROMFEED_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("PROMFEED_RETRY_BACKOFF_BASE_SECS", "2")?;
    let max_concurrent_fetches = parse_positive_usize("PROMFEED_MAX_CONCURRENT_FETCHES", "1")?;

    Ok(AppConfig {
        log_level,
        feeds_path,
        feed_ids,
        feed_source,
        cache_dir,
        output_dir,
        output_prefix,
        output_files,
        chunk_size,
        availability_policy,
        dedup_key,
        emit_empty,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        max_concurrent_fetches,
    })
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
