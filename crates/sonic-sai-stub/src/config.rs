//! Stub configuration.
//!
//! All values have defaults matching the reference switch profile, so an
//! empty JSON object (or no file at all) yields a usable configuration:
//!
//! ```json
//! {
//!   "switch": { "port_count": 32 },
//!   "lag": { "max_lags": 5, "max_ports_per_lag": 16 }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lag::PORT_MASK_CAPACITY;

/// Default number of front-panel ports reported by the switch.
pub const DEFAULT_PORT_COUNT: u32 = 32;
/// Default number of LAG table slots.
pub const DEFAULT_MAX_LAGS: u32 = 5;
/// Default number of member ports per LAG.
pub const DEFAULT_MAX_PORTS_PER_LAG: u32 = 16;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config [{field}]: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Switch-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    /// Number of ports in the switch port list.
    pub port_count: u32,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            port_count: DEFAULT_PORT_COUNT,
        }
    }
}

/// LAG table capacities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagConfig {
    /// Number of LAG table slots.
    pub max_lags: u32,
    /// Maximum member ports in one LAG.
    pub max_ports_per_lag: u32,
}

impl Default for LagConfig {
    fn default() -> Self {
        Self {
            max_lags: DEFAULT_MAX_LAGS,
            max_ports_per_lag: DEFAULT_MAX_PORTS_PER_LAG,
        }
    }
}

/// Complete stub configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StubConfig {
    pub switch: SwitchConfig,
    pub lag: LagConfig,
}

impl StubConfig {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: StubConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks capacities against each other and the port mask width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.switch.port_count == 0 {
            return Err(ConfigError::invalid("switch.port_count", "must be non-zero"));
        }
        if self.switch.port_count > PORT_MASK_CAPACITY {
            return Err(ConfigError::invalid(
                "switch.port_count",
                format!(
                    "{} exceeds port mask capacity {}",
                    self.switch.port_count, PORT_MASK_CAPACITY
                ),
            ));
        }
        if self.lag.max_lags == 0 {
            return Err(ConfigError::invalid("lag.max_lags", "must be non-zero"));
        }
        if self.lag.max_ports_per_lag == 0 {
            return Err(ConfigError::invalid("lag.max_ports_per_lag", "must be non-zero"));
        }
        if self.lag.max_ports_per_lag > self.switch.port_count {
            return Err(ConfigError::invalid(
                "lag.max_ports_per_lag",
                format!(
                    "{} exceeds switch port count {}",
                    self.lag.max_ports_per_lag, self.switch.port_count
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = StubConfig::default();
        assert_eq!(config.switch.port_count, 32);
        assert_eq!(config.lag.max_lags, 5);
        assert_eq!(config.lag.max_ports_per_lag, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = StubConfig::from_json_str(r#"{ "lag": { "max_lags": 8 } }"#).unwrap();
        assert_eq!(config.lag.max_lags, 8);
        assert_eq!(config.lag.max_ports_per_lag, DEFAULT_MAX_PORTS_PER_LAG);
        assert_eq!(config.switch.port_count, DEFAULT_PORT_COUNT);

        let empty = StubConfig::from_json_str("{}").unwrap();
        assert_eq!(empty, StubConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        let err = StubConfig::from_json_str(r#"{ "lag": { "max_lags": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "lag.max_lags", .. }));

        let err = StubConfig::from_json_str(r#"{ "switch": { "port_count": 4096 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "switch.port_count", .. }));

        let err = StubConfig::from_json_str(
            r#"{ "switch": { "port_count": 8 }, "lag": { "max_ports_per_lag": 9 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "lag.max_ports_per_lag", .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = StubConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "switch": {{ "port_count": 64 }} }}"#).unwrap();

        let config = StubConfig::from_file(file.path()).unwrap();
        assert_eq!(config.switch.port_count, 64);

        let err = StubConfig::from_file("/nonexistent/stub.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
