use std::path::PathBuf;

use crate::error::ConfigError;
use crate::validate::ValidationOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Root directory holding one sub-directory per profiled site.
    pub profiles_dir: PathBuf,
    pub log_level: String,
    /// Default for strict validation when a command does not say otherwise.
    pub strict: bool,
}

impl AppConfig {
    /// Validation options for a command, where `strict_flag` forces strict mode on.
    #[must_use]
    pub fn validation_options(&self, strict_flag: bool) -> ValidationOptions {
        ValidationOptions {
            strict: self.strict || strict_flag,
        }
    }
}

/// Load configuration from environment variables.
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

/// Load configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration from the provided env-var lookup so parsing can be
/// tested with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let profiles_dir = PathBuf::from(or_default("SITEPROFILE_DIR", "./selectors"));
    let log_level = or_default("SITEPROFILE_LOG_LEVEL", "info");
    let strict = parse_bool("SITEPROFILE_STRICT", &or_default("SITEPROFILE_STRICT", "false"))?;

    Ok(AppConfig {
        profiles_dir,
        log_level,
        strict,
    })
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected true/false, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
