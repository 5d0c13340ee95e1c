use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::app_config::{ApiKeyEntry, AppConfig, Environment, StoreConfig};
use crate::keyword::KeywordWeights;
use crate::ConfigError;

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
/// Decoupled from the process environment so it can be driven from a map in
/// tests.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_weight = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("weight must be a finite non-negative number, got {raw}"),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("BRANDKIT_ENV", "development"));
    let listen_addr = parse_listen_addr(&or_default("BRANDKIT_LISTEN", ":8080"))?;
    let log_level = or_default("BRANDKIT_LOG_LEVEL", "info");
    let templates_path = PathBuf::from(or_default(
        "BRANDKIT_TEMPLATES_PATH",
        "./config/templates.yaml",
    ));
    let api_keys = match optional("BRANDKIT_API_KEYS") {
        Some(raw) => parse_api_keys(&raw)?,
        None => Vec::new(),
    };

    let autofill_client_id = require("AUTOFILL_CLIENT_ID")?;
    let autofill_client_secret = require("AUTOFILL_CLIENT_SECRET")?;
    let autofill_base_url = trim_base_url(&or_default(
        "AUTOFILL_BASE_URL",
        "https://api.canva.com/rest/v1",
    ));
    let autofill_token_path =
        PathBuf::from(or_default("AUTOFILL_TOKEN_PATH", "./autofill-tokens.json"));
    let autofill_refresh_buffer_secs = parse_u64("AUTOFILL_REFRESH_BUFFER_SECS", "300")?;

    let openai_api_key = require("OPENAI_API_KEY")?;
    let openai_base_url = trim_base_url(&or_default(
        "OPENAI_BASE_URL",
        "https://api.openai.com/v1",
    ));
    let llm_primary_model = or_default("LLM_PRIMARY_MODEL", "gpt-4o");
    let llm_cheap_model = or_default("LLM_CHEAP_MODEL", "gpt-4o-mini");
    let llm_embedding_model = or_default("LLM_EMBEDDING_MODEL", "text-embedding-3-small");

    let scraper_base_url = trim_base_url(&require("SCRAPER_BASE_URL")?);
    let scraper_request_timeout_secs = parse_u64("SCRAPER_REQUEST_TIMEOUT_SECS", "60")?;

    let store = match optional("STORE_URL") {
        Some(url) => Some(StoreConfig {
            url: trim_base_url(&url),
            service_key: require("STORE_SERVICE_KEY")?,
        }),
        None => None,
    };

    let keyword_weights = KeywordWeights {
        high_bid: parse_weight("KEYWORD_WEIGHT_HIGH_BID", "0.05")?,
        low_bid: parse_weight("KEYWORD_WEIGHT_LOW_BID", "0.05")?,
        competition: parse_weight("KEYWORD_WEIGHT_COMPETITION", "0.30")?,
        inverted_kd: parse_weight("KEYWORD_WEIGHT_INVERTED_KD", "0.50")?,
    };

    if env == Environment::Production {
        if store.is_none() {
            return Err(ConfigError::MissingEnvVar("STORE_URL".to_string()));
        }
        if api_keys.is_empty() {
            return Err(ConfigError::MissingEnvVar("BRANDKIT_API_KEYS".to_string()));
        }
    }

    Ok(AppConfig {
        env,
        listen_addr,
        log_level,
        templates_path,
        api_keys,
        autofill_client_id,
        autofill_client_secret,
        autofill_base_url,
        autofill_token_path,
        autofill_refresh_buffer_secs,
        openai_api_key,
        openai_base_url,
        llm_primary_model,
        llm_cheap_model,
        llm_embedding_model,
        scraper_base_url,
        scraper_request_timeout_secs,
        store,
        keyword_weights,
    })
}

/// Parse a bind address. A bare `:port` binds every IPv4 interface.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` naming `BRANDKIT_LISTEN` when the
/// value is neither `:port` nor a socket address.
pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "BRANDKIT_LISTEN".to_string(),
        reason,
    };

    let raw = raw.trim();
    if let Some(port) = raw.strip_prefix(':') {
        let port = port.parse::<u16>().map_err(|e| invalid(e.to_string()))?;
        return Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
    }
    raw.parse::<SocketAddr>()
        .map_err(|e| invalid(e.to_string()))
}

/// Parse `key=owner` pairs separated by commas.
fn parse_api_keys(raw: &str) -> Result<Vec<ApiKeyEntry>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, owner) = pair
                .split_once('=')
                .map(|(k, o)| (k.trim(), o.trim()))
                .filter(|(k, o)| !k.is_empty() && !o.is_empty())
                .ok_or_else(|| ConfigError::InvalidEnvVar {
                    var: "BRANDKIT_API_KEYS".to_string(),
                    reason: "expected comma-separated key=owner pairs".to_string(),
                })?;
            Ok(ApiKeyEntry {
                key: key.to_string(),
                owner: owner.to_string(),
            })
        })
        .collect()
}

fn trim_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
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

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
