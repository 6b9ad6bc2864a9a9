//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then command-line flags (applied by the binary).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use violations_dashboard_dataset::DatasetPaths;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";

/// Errors that can occur while building the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`ServerConfig`].
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// An environment override has an invalid value.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Runtime configuration for the dashboard server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// CSV for the primary dataset.
    pub primary_csv: PathBuf,
    /// CSV for the validated-subset dataset.
    pub validated_csv: PathBuf,
    /// Directory of front-end files served at `/`, if any.
    pub static_dir: Option<PathBuf>,
    /// Maximum number of concurrently open client sessions.
    pub max_sessions: usize,
    /// Seconds a session may sit unused before it can be evicted.
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            primary_csv: PathBuf::from("data/filtered_data.csv"),
            validated_csv: PathBuf::from("data/valid_victim_data.csv"),
            static_dir: None,
            max_sessions: 10_000,
            session_idle_secs: 1800,
        }
    }
}

impl ServerConfig {
    /// Parses a TOML document; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed or has
    /// unknown keys.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Loads the config file named by `path` or [`CONFIG_ENV`] (if either
    /// is set) and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable or an override is
    /// invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let base = match path.or(env_path.as_deref()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `BIND_ADDR`, `PORT`, `PRIMARY_CSV`, `VALIDATED_CSV`,
    /// `STATIC_DIR` and `SESSION_IDLE_SECS` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `PORT` or
    /// `SESSION_IDLE_SECS` is not a valid number.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: port,
            })?;
        }
        if let Some(path) = lookup("PRIMARY_CSV") {
            self.primary_csv = PathBuf::from(path);
        }
        if let Some(path) = lookup("VALIDATED_CSV") {
            self.validated_csv = PathBuf::from(path);
        }
        if let Some(path) = lookup("STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup("SESSION_IDLE_SECS") {
            self.session_idle_secs = secs.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SESSION_IDLE_SECS",
                value: secs,
            })?;
        }
        Ok(self)
    }

    #[must_use]
    pub const fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    #[must_use]
    pub fn dataset_paths(&self) -> DatasetPaths {
        DatasetPaths {
            primary: self.primary_csv.clone(),
            validated_subset: self.validated_csv.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn toml_overrides_selected_keys() {
        let config = ServerConfig::from_toml_str(
            r#"
            port = 9000
            primary_csv = "/srv/data/main.csv"
            static_dir = "app/dist"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.primary_csv, PathBuf::from("/srv/data/main.csv"));
        assert_eq!(config.static_dir, Some(PathBuf::from("app/dist")));
        assert_eq!(config.bind_addr, "127.0.0.1");
    }

    #[test]
    fn unknown_toml_key_is_rejected() {
        let err = ServerConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let config = ServerConfig::default()
            .with_env_overrides(env(&[
                ("BIND_ADDR", "0.0.0.0"),
                ("PORT", "8050"),
                ("VALIDATED_CSV", "other.csv"),
            ]))
            .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 8050);
        assert_eq!(config.validated_csv, PathBuf::from("other.csv"));
        assert_eq!(
            config.primary_csv,
            ServerConfig::default().primary_csv
        );
    }

    #[test]
    fn session_idle_timeout_is_configurable() {
        assert_eq!(
            ServerConfig::default().session_idle_timeout(),
            Duration::from_secs(1800)
        );

        let config = ServerConfig::from_toml_str("session_idle_secs = 60").unwrap();
        assert_eq!(config.session_idle_timeout(), Duration::from_secs(60));

        let config = config
            .with_env_overrides(env(&[("SESSION_IDLE_SECS", "5")]))
            .unwrap();
        assert_eq!(config.session_idle_timeout(), Duration::from_secs(5));

        let err = ServerConfig::default()
            .with_env_overrides(env(&[("SESSION_IDLE_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "SESSION_IDLE_SECS",
                ..
            }
        ));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = ServerConfig::default()
            .with_env_overrides(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = ServerConfig::from_file(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn dataset_paths_follow_config() {
        let config = ServerConfig::default();
        let paths = config.dataset_paths();
        assert_eq!(paths.primary, config.primary_csv);
        assert_eq!(paths.validated_subset, config.validated_csv);
    }
}
