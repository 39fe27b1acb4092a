//! Environment overrides
//!
//! Each variable replaces one configuration value when set to a non-empty
//! string. Booleans are false only for `0` or `false` (any case).

use crate::config::types::Config;
use crate::ConfigError;
use std::str::FromStr;

/// Applies overrides from the process environment, loading `.env` first
pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    // A missing .env file is the normal case
    let _ = dotenvy::dotenv();
    apply_overrides_from(config, |var| std::env::var(var).ok())
}

/// Applies overrides from an arbitrary variable lookup
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|value| !value.is_empty());

    if let Some(value) = get("OUTPUT_DIR") {
        config.output.output_dir = value;
    }
    if let Some(value) = get("MAKE_SUBDIRS") {
        config.output.make_subdirs = to_bool(&value);
    }
    if let Some(value) = get("SKIP_SUBCATS") {
        config.crawler.skip_subcats = to_bool(&value);
    }
    if let Some(value) = get("SKIP_PAGES") {
        config.crawler.skip_pages = to_bool(&value);
    }
    if let Some(value) = get("URL_SLEEP") {
        config.crawler.url_sleep = parse_number("URL_SLEEP", &value)?;
    }
    if let Some(value) = get("MAX_RETRIES") {
        config.crawler.max_retries = parse_number("MAX_RETRIES", &value)?;
    }
    if let Some(value) = get("MAX_DEPTH") {
        config.crawler.max_depth = Some(parse_number("MAX_DEPTH", &value)?);
    }
    if let Some(value) = get("SUBCATS_START") {
        config.markers.subcategories = value;
    }
    if let Some(value) = get("PAGES_START") {
        config.markers.pages_start = value;
    }
    if let Some(value) = get("PAGES_END") {
        config.markers.pages_end = value;
    }
    if let Some(value) = get("ACCESS_DENIED_MARKER") {
        config.markers.access_denied = value;
    }

    Ok(())
}

/// Interprets a flag value
pub fn to_bool(value: &str) -> bool {
    !(value == "0" || value.eq_ignore_ascii_case("false"))
}

fn parse_number<T: FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}
