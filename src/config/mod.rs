//! Configuration management for the HomiSmart bridge

use crate::error::{HomismartError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fmt};
use url::Url;

/// Default vendor cloud endpoint
pub const DEFAULT_ENDPOINT: &str = "wss://api.homismart.com";

/// Default polling interval; push events cover the gaps in between
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    /// Vendor cloud configuration
    pub homismart: HomismartConfig,

    /// Polling configuration
    pub polling: PollingConfig,

    /// Scene storage configuration
    pub scenes: SceneStorageConfig,
}

/// Vendor cloud configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomismartConfig {
    /// Cloud endpoint URL
    pub endpoint: Url,

    /// Account credentials
    pub credentials: HomismartCredentials,
}

impl Default for HomismartConfig {
    fn default() -> Self {
        Self {
            // The default endpoint string is known-valid.
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint must parse"),
            credentials: HomismartCredentials::default(),
        }
    }
}

/// Account credentials for the vendor cloud
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct HomismartCredentials {
    /// Account username
    pub username: String,

    /// Account password
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl fmt::Debug for HomismartCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HomismartCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Snapshot refresh interval
    #[serde(with = "humantime_serde")]
    pub update_interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
        }
    }
}

/// Scene storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneStorageConfig {
    /// Path of the JSON scene document
    pub path: PathBuf,
}

impl Default for SceneStorageConfig {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join("homismart-bridge").join("scenes.json"),
        }
    }
}

impl BridgeConfig {
    /// Build configuration from environment variables
    ///
    /// `HOMISMART_USERNAME` and `HOMISMART_PASSWORD` are required;
    /// `HOMISMART_ENDPOINT`, `HOMISMART_UPDATE_INTERVAL` (seconds) and
    /// `HOMISMART_SCENES_FILE` override the defaults.
    pub fn from_env() -> Result<Self> {
        let username = env::var("HOMISMART_USERNAME")
            .map_err(|_| HomismartError::config("HOMISMART_USERNAME not set"))?;
        let password = env::var("HOMISMART_PASSWORD")
            .map_err(|_| HomismartError::config("HOMISMART_PASSWORD not set"))?;

        let endpoint = match env::var("HOMISMART_ENDPOINT") {
            Ok(raw) => Url::parse(&raw)
                .map_err(|e| HomismartError::config(format!("Invalid HOMISMART_ENDPOINT: {e}")))?,
            Err(_) => Url::parse(DEFAULT_ENDPOINT).expect("default endpoint must parse"),
        };

        let update_interval = match env::var("HOMISMART_UPDATE_INTERVAL") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    HomismartError::config(format!(
                        "Invalid HOMISMART_UPDATE_INTERVAL: {raw} (expected seconds)"
                    ))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => DEFAULT_UPDATE_INTERVAL,
        };

        let scenes = match env::var("HOMISMART_SCENES_FILE") {
            Ok(path) => SceneStorageConfig {
                path: PathBuf::from(path),
            },
            Err(_) => SceneStorageConfig::default(),
        };

        let config = Self {
            homismart: HomismartConfig {
                endpoint,
                credentials: HomismartCredentials { username, password },
            },
            polling: PollingConfig { update_interval },
            scenes,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.homismart.credentials.username.is_empty() {
            return Err(HomismartError::config("Username must not be empty"));
        }

        if self.homismart.credentials.password.is_empty() {
            return Err(HomismartError::config("Password must not be empty"));
        }

        match self.homismart.endpoint.scheme() {
            "http" | "https" | "ws" | "wss" => {}
            scheme => {
                return Err(HomismartError::config(format!(
                    "Unsupported endpoint scheme: {scheme}"
                )));
            }
        }

        if self.polling.update_interval.is_zero() {
            return Err(HomismartError::config("Update interval must be non-zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.homismart.credentials = HomismartCredentials {
            username: "user@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_empty_credentials_fail() {
        let mut config = valid_config();
        config.homismart.credentials.username.clear();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.homismart.credentials.password.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_endpoint_scheme_fails() {
        let mut config = valid_config();
        config.homismart.endpoint = Url::parse("ftp://example.com").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_fails() {
        let mut config = valid_config();
        config.polling.update_interval = Duration::from_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let config = valid_config();
        let rendered = format!("{:?}", config.homismart.credentials);
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("hunter2"));
    }
}
