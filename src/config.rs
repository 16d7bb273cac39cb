//! Dev-server configuration from the environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8002;
pub const DEFAULT_PROXY_TARGET: &str = "http://localhost:8001";
pub const DEFAULT_PROXY_PREFIX: &str = "/api";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevServerConfig {
    pub port: u16,
    /// Origin requests are forwarded to, without a trailing slash.
    pub target: String,
    /// Path prefix stripped before forwarding, e.g. `/api`.
    pub prefix: String,
    /// Directory served for every non-proxied path, if set.
    pub static_dir: Option<PathBuf>,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            target: DEFAULT_PROXY_TARGET.to_owned(),
            prefix: DEFAULT_PROXY_PREFIX.to_owned(),
            static_dir: None,
        }
    }
}

impl DevServerConfig {
    /// Read `PORT`, `MEDIMEOW_PROXY_TARGET`, `MEDIMEOW_PROXY_PREFIX` and
    /// `MEDIMEOW_STATIC_DIR`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable port or a prefix that is only `/`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// # Errors
    ///
    /// See [`DevServerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let port = match set("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
        };
        let target = set("MEDIMEOW_PROXY_TARGET")
            .map_or_else(|| DEFAULT_PROXY_TARGET.to_owned(), |t| t.trim_end_matches('/').to_owned());
        let prefix = match set("MEDIMEOW_PROXY_PREFIX") {
            None => DEFAULT_PROXY_PREFIX.to_owned(),
            Some(raw) => normalize_prefix(&raw).ok_or(ConfigError::Invalid { key: "MEDIMEOW_PROXY_PREFIX", value: raw })?,
        };

        Ok(Self { port, target, prefix, static_dir: set("MEDIMEOW_STATIC_DIR").map(PathBuf::from) })
    }
}

fn normalize_prefix(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("/{trimmed}"))
}
