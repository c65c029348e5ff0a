//! Client configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use patchbay_core::NamePolicy;

use crate::error::ConfigError;

/// Name collision policy as written in TOML.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NamePolicyConfig {
    /// Take a suffixed name when the requested one is taken.
    #[default]
    Disambiguate,
    /// Fail when the requested name is taken.
    Exact,
}

impl From<NamePolicyConfig> for NamePolicy {
    fn from(policy: NamePolicyConfig) -> Self {
        match policy {
            NamePolicyConfig::Disambiguate => NamePolicy::Disambiguate,
            NamePolicyConfig::Exact => NamePolicy::Exact,
        }
    }
}

/// Client settings.
///
/// ```toml
/// name_policy = "exact"
/// server_name = "studio"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// What to do when the requested client name is taken.
    pub name_policy: NamePolicyConfig,
    /// Server to connect to. `None` means the default server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

impl ClientConfig {
    /// The collision policy as the registry understands it.
    pub fn name_policy(&self) -> NamePolicy {
        self.name_policy.into()
    }

    /// Load a client configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a client configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
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
    fn default_policy_disambiguates() {
        let config = ClientConfig::from_toml("").unwrap();
        assert_eq!(config.name_policy(), NamePolicy::Disambiguate);
        assert_eq!(config.server_name, None);
    }

    #[test]
    fn exact_policy_parses() {
        let config = ClientConfig::from_toml("name_policy = \"exact\"\nserver_name = \"studio\"\n").unwrap();
        assert_eq!(config.name_policy(), NamePolicy::Exact);
        assert_eq!(config.server_name.as_deref(), Some("studio"));
    }

    #[test]
    fn unknown_policy_rejected() {
        assert!(matches!(
            ClientConfig::from_toml("name_policy = \"fuzzy\""),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
