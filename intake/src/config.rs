//! Client configuration parsed from environment variables.

use std::time::Duration;

use crate::envelope::SuccessCodes;
use crate::transport::DEFAULT_CONNECT_TIMEOUT_SECS;

pub const DEFAULT_LOGIN_ORIGIN: &str = "http://124.221.70.136:11391";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8002/api";
pub const DEFAULT_LOGIN_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_API_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_API_SUCCESS_CODES: &str = "200,0";
pub const DEFAULT_DOCTOR_SUCCESS_CODES: &str = "10000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Origin of the patient-login and doctor instances.
    pub login_origin: String,
    /// Base of the patient API instance (normally the dev server's `/api`).
    pub api_base_url: String,
    pub login_timeout: Duration,
    pub api_timeout: Duration,
    pub connect_timeout: Duration,
    pub api_success_codes: SuccessCodes,
    /// Sentinel of the login-origin backend, shared by the patient-login and
    /// doctor instances.
    pub doctor_success_codes: SuccessCodes,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            login_origin: DEFAULT_LOGIN_ORIGIN.to_owned(),
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            login_timeout: Duration::from_millis(DEFAULT_LOGIN_TIMEOUT_MS),
            api_timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            api_success_codes: SuccessCodes::parse_list(DEFAULT_API_SUCCESS_CODES),
            doctor_success_codes: SuccessCodes::parse_list(DEFAULT_DOCTOR_SUCCESS_CODES),
        }
    }
}

impl IntakeConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `MEDIMEOW_LOGIN_ORIGIN`: default `http://124.221.70.136:11391`
    /// - `MEDIMEOW_API_BASE_URL`: default `http://localhost:8002/api`
    /// - `MEDIMEOW_LOGIN_TIMEOUT_MS`: default 10000
    /// - `MEDIMEOW_API_TIMEOUT_MS`: default 5000
    /// - `MEDIMEOW_CONNECT_TIMEOUT_SECS`: default 10
    /// - `MEDIMEOW_API_SUCCESS_CODES`: comma list, default `200,0`
    /// - `MEDIMEOW_DOCTOR_SUCCESS_CODES`: comma list, default `10000`
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric value does not parse or a success-code
    /// list is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`IntakeConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        Ok(Self {
            login_origin: text("MEDIMEOW_LOGIN_ORIGIN", DEFAULT_LOGIN_ORIGIN),
            api_base_url: text("MEDIMEOW_API_BASE_URL", DEFAULT_API_BASE_URL),
            login_timeout: Duration::from_millis(parse_u64(&lookup, "MEDIMEOW_LOGIN_TIMEOUT_MS", DEFAULT_LOGIN_TIMEOUT_MS)?),
            api_timeout: Duration::from_millis(parse_u64(&lookup, "MEDIMEOW_API_TIMEOUT_MS", DEFAULT_API_TIMEOUT_MS)?),
            connect_timeout: Duration::from_secs(parse_u64(
                &lookup,
                "MEDIMEOW_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?),
            api_success_codes: parse_codes(&lookup, "MEDIMEOW_API_SUCCESS_CODES", DEFAULT_API_SUCCESS_CODES)?,
            doctor_success_codes: parse_codes(&lookup, "MEDIMEOW_DOCTOR_SUCCESS_CODES", DEFAULT_DOCTOR_SUCCESS_CODES)?,
        })
    }
}

fn parse_u64<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_codes<F>(lookup: &F, key: &'static str, default: &str) -> Result<SuccessCodes, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(SuccessCodes::parse_list(default));
    };
    let codes = SuccessCodes::parse_list(&raw);
    if codes.is_empty() {
        return Err(ConfigError::Invalid { key, value: raw });
    }
    Ok(codes)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
