use std::path::PathBuf;

use crate::app_config::{
    AppConfig, FlairIds, MetricsStoreConfig, RedditCredentials, SearchSettings,
};
use crate::ConfigError;

pub const DEFAULT_SUBREDDIT: &str = "CryptoSentry";
pub const DEFAULT_POSITIVE_FLAIR_ID: &str = "de2aaf50-d192-11eb-acd5-0ef0cae72431";
pub const DEFAULT_NEGATIVE_FLAIR_ID: &str = "f35be8d0-d192-11eb-8588-0eaeb32d0d51";
pub const DEFAULT_INFLUX_DATABASE: &str = "cryptosentry";

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

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let reddit = RedditCredentials {
        client_id: require("REDDIT_CLIENT_ID")?,
        client_secret: require("REDDIT_CLIENT_SECRET")?,
        username: require("REDDIT_USERNAME")?,
        password: require("REDDIT_PASSWORD")?,
        user_agent: require("REDDIT_USER_AGENT")?,
    };

    let subreddit = or_default("CRYPTOSENTRY_SUBREDDIT", DEFAULT_SUBREDDIT);
    let flairs = FlairIds {
        positive: or_default("CRYPTOSENTRY_POSITIVE_FLAIR_ID", DEFAULT_POSITIVE_FLAIR_ID),
        negative: or_default("CRYPTOSENTRY_NEGATIVE_FLAIR_ID", DEFAULT_NEGATIVE_FLAIR_ID),
    };

    let period = or_default("CRYPTOSENTRY_SEARCH_PERIOD", "24h");
    validate_period(&period)?;
    let pages = parse_u32("CRYPTOSENTRY_SEARCH_PAGES", "5")?;
    let language = or_default("CRYPTOSENTRY_SEARCH_LANGUAGE", "en");

    let topics_path = lookup("CRYPTOSENTRY_TOPICS_PATH").ok().map(PathBuf::from);

    let metrics = lookup("CRYPTOSENTRY_INFLUX_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .map(|url| MetricsStoreConfig {
            url,
            database: or_default("CRYPTOSENTRY_INFLUX_DATABASE", DEFAULT_INFLUX_DATABASE),
        });

    let http_timeout_secs = parse_u64("CRYPTOSENTRY_HTTP_TIMEOUT_SECS", "30")?;
    let log_level = or_default("CRYPTOSENTRY_LOG_LEVEL", "info");

    Ok(AppConfig {
        reddit,
        subreddit,
        flairs,
        search: SearchSettings {
            period,
            pages,
            language,
        },
        topics_path,
        metrics,
        http_timeout_secs,
        log_level,
    })
}

/// Validate a search period such as `24h`, `7d`, `1m` or `1y`.
fn validate_period(period: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEnvVar {
        var: "CRYPTOSENTRY_SEARCH_PERIOD".to_string(),
        reason: format!("{reason}: '{period}'"),
    };

    let Some(unit) = period.chars().last() else {
        return Err(invalid("period must not be empty"));
    };
    if !matches!(unit, 'h' | 'd' | 'm' | 'y') {
        return Err(invalid("period unit must be one of h, d, m, y"));
    }

    let count = &period[..period.len() - unit.len_utf8()];
    match count.parse::<u32>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(invalid("period must start with a positive integer")),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
