//! Service configuration.
//!
//! Values are layered: built-in defaults, then `importer.toml` in the working
//! directory if present, then `IMPORTER_*` environment variables
//! (`IMPORTER_PORT=9000`, `IMPORTER_STRICT_MAPPING=true`, ...).

use crate::error::ConfigError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_FILE: &str = "importer.toml";
const ENV_PREFIX: &str = "IMPORTER_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding records and mapping templates.
    pub database_path: PathBuf,
    pub upload_limit_bytes: usize,
    /// Row count from which records are built on the rayon pool.
    pub parallel_build_threshold: usize,
    /// Refuse mappings where two columns claim the same canonical field.
    pub strict_mapping: bool,
    pub preview_rows: usize,
    /// Uncommitted sessions untouched for this long are dropped.
    pub session_ttl_secs: u64,
    /// Upper bound on sessions held in memory; the least recently used goes first.
    pub max_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("importer.sqlite"),
            upload_limit_bytes: 10 * 1024 * 1024,
            parallel_build_threshold: 1000,
            strict_mapping: false,
            preview_rows: 5,
            session_ttl_secs: 30 * 60,
            max_sessions: 64,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_limit_bytes == 0 {
            return Err(ConfigError::Invalid(
                "upload_limit_bytes must be greater than zero".to_string(),
            ));
        }
        if self.parallel_build_threshold == 0 {
            return Err(ConfigError::Invalid(
                "parallel_build_threshold must be greater than zero".to_string(),
            ));
        }
        if self.max_sessions == 0 {
            return Err(ConfigError::Invalid(
                "max_sessions must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config =
            Config::from_figment(Figment::from(Serialized::defaults(Config::default()))).unwrap();
        assert_eq!(config.port, 8080);
        assert!(!config.strict_mapping);
    }

    #[test]
    fn toml_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(
            "port = 9090\nstrict_mapping = true\npreview_rows = 2",
        ));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.port, 9090);
        assert!(config.strict_mapping);
        assert_eq!(config.preview_rows, 2);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("parallel_build_threshold = 0"));
        assert!(matches!(
            Config::from_figment(figment),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn session_limits_are_configurable() {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("session_ttl_secs = 90\nmax_sessions = 3"));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.session_ttl(), Duration::from_secs(90));
        assert_eq!(config.max_sessions, 3);

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("max_sessions = 0"));
        assert!(Config::from_figment(figment).is_err());
    }
}
