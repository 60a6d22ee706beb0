use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let log_level = or_default("HALFOFF_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("HALFOFF_OUTPUT_DIR", "./out"));

    let max_captures = parse_usize("HALFOFF_MAX_CAPTURES", "20")?;
    let min_body_bytes = parse_usize("HALFOFF_MIN_BODY_BYTES", "2000")?;
    // 5 MiB
    let max_body_bytes = parse_usize("HALFOFF_MAX_BODY_BYTES", "5242880")?;

    if max_body_bytes < min_body_bytes {
        return Err(ConfigError::InvalidEnvVar {
            var: "HALFOFF_MAX_BODY_BYTES".to_string(),
            reason: format!("must be >= HALFOFF_MIN_BODY_BYTES ({min_body_bytes})"),
        });
    }

    Ok(AppConfig {
        log_level,
        output_dir,
        max_captures,
        min_body_bytes,
        max_body_bytes,
    })
}
