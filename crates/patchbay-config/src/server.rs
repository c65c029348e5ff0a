//! Server configuration file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use patchbay_core::Limits;
use patchbay_core::name::{
    DEFAULT_MAX_ALIASES, DEFAULT_MAX_CLIENT_NAME_LEN, DEFAULT_MAX_PORT_NAME_LEN,
};

use crate::error::ConfigError;
use crate::validation::validate_server_config;

/// Name of the server when none is configured.
pub const DEFAULT_SERVER_NAME: &str = "default";

/// Server settings.
///
/// # TOML Format
///
/// ```toml
/// name = "studio"
///
/// [limits]
/// max_client_name_len = 63
/// max_port_name_len = 255
/// max_aliases = 2
/// max_connections_per_port = 32
/// ```
///
/// Every field is optional; omitted fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server name.
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Naming and connection limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_server_name() -> String {
    DEFAULT_SERVER_NAME.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            limits: LimitsConfig::default(),
        }
    }
}

/// The `[limits]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum client name length in bytes.
    pub max_client_name_len: usize,
    /// Maximum full port name length in bytes.
    pub max_port_name_len: usize,
    /// Alias slots per port.
    pub max_aliases: usize,
    /// Connections allowed per port. Omit for no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections_per_port: Option<usize>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_client_name_len: DEFAULT_MAX_CLIENT_NAME_LEN,
            max_port_name_len: DEFAULT_MAX_PORT_NAME_LEN,
            max_aliases: DEFAULT_MAX_ALIASES,
            max_connections_per_port: None,
        }
    }
}

impl From<LimitsConfig> for Limits {
    fn from(config: LimitsConfig) -> Self {
        Limits {
            max_client_name_len: config.max_client_name_len,
            max_port_name_len: config.max_port_name_len,
            max_aliases: config.max_aliases,
            max_connections_per_port: config.max_connections_per_port,
        }
    }
}

impl ServerConfig {
    /// Create a configuration with the given name and default limits.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the per-port connection limit.
    pub fn with_connection_limit(mut self, limit: usize) -> Self {
        self.limits.max_connections_per_port = Some(limit);
        self
    }

    /// Set the number of alias slots per port.
    pub fn with_max_aliases(mut self, count: usize) -> Self {
        self.limits.max_aliases = count;
        self
    }

    /// The limits to hand to a registry.
    pub fn limits(&self) -> Limits {
        self.limits.into()
    }

    /// Check every constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(validate_server_config(self)?)
    }

    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), server = %config.name, "loaded server config");
        Ok(config)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.limits(), Limits::default());
    }

    #[test]
    fn partial_limits_table() {
        let config = ServerConfig::from_toml(
            r#"
            name = "studio"
            [limits]
            max_connections_per_port = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.name, "studio");
        assert_eq!(config.limits.max_aliases, DEFAULT_MAX_ALIASES);
        assert_eq!(config.limits().max_connections_per_port, Some(4));
    }

    #[test]
    fn invalid_values_fail_to_load() {
        let err = ServerConfig::from_toml("[limits]\nmax_client_name_len = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let err = ServerConfig::from_toml("[limits]\nmax_aliases = \"two\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn unlimited_connections_not_serialized() {
        let text = ServerConfig::default().to_toml().unwrap();
        assert!(!text.contains("max_connections_per_port"), "got: {text}");
        let text = ServerConfig::default().with_connection_limit(8).to_toml().unwrap();
        assert!(text.contains("max_connections_per_port = 8"), "got: {text}");
    }
}
