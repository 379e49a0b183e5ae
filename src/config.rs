use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{FibError, Result, MAX_N};

/// Plugin settings, read from a TOML file such as:
///
/// ```toml
/// max_n = 40
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    #[serde(default = "default_max_n")]
    pub max_n: u32,
}

fn default_max_n() -> u32 {
    MAX_N
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            max_n: default_max_n(),
        }
    }
}

impl PluginConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PluginConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_n > MAX_N {
            return Err(FibError::InvalidConfig(format!(
                "max_n = {} exceeds the largest supported index {}",
                self.max_n, MAX_N
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PluginConfig::from_toml_str("").unwrap();
        assert_eq!(config, PluginConfig::default());
        assert_eq!(config.max_n, MAX_N);
    }

    #[test]
    fn test_max_n_is_read() {
        let config = PluginConfig::from_toml_str("max_n = 12").unwrap();
        assert_eq!(config.max_n, 12);
    }

    #[test]
    fn test_max_n_above_bound_is_rejected() {
        let result = PluginConfig::from_toml_str("max_n = 47");
        assert!(matches!(result, Err(FibError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = PluginConfig::from_toml_str("delay_ms = 10");
        assert!(matches!(result, Err(FibError::TomlParse(_))));
    }

    #[test]
    fn test_negative_max_n_is_a_parse_error() {
        let result = PluginConfig::from_toml_str("max_n = -3");
        assert!(matches!(result, Err(FibError::TomlParse(_))));
    }
}
