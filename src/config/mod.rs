//! Site configuration loading

use crate::core::error::ConfigError;
use crate::core::locale::{Locale, LocaleRegistry};
use crate::core::resolver::PrefixPolicy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Locale settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Enabled locales, in display order
    pub enabled: Vec<Locale>,

    /// Locale used when the path carries no prefix
    pub default: Locale,

    /// Whether the default locale may be served without a prefix
    #[serde(default)]
    pub prefix: PrefixPolicy,
}

/// Complete site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Address to bind, e.g. `0.0.0.0:3000`
    #[serde(default = "default_bind")]
    pub bind: String,

    pub locales: LocaleConfig,

    /// Directory holding `<code>.json` catalogs; the built-in catalogs are
    /// used when unset
    #[serde(default)]
    pub messages_dir: Option<PathBuf>,

    /// Directory served under `/static`
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl SiteConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Build the locale registry, checking that the default is enabled
    pub fn registry(&self) -> Result<LocaleRegistry, ConfigError> {
        LocaleRegistry::new(self.locales.enabled.iter().copied(), self.locales.default).ok_or_else(
            || ConfigError::InvalidValue {
                field: "locales.default".to_string(),
                value: self.locales.default.code().to_string(),
                message: "default locale must be one of the enabled locales".to_string(),
            },
        )
    }

    /// English and Arabic, English default, unprefixed English allowed
    pub fn default_config() -> Self {
        Self {
            bind: default_bind(),
            locales: LocaleConfig {
                enabled: Locale::ALL.to_vec(),
                default: Locale::En,
                prefix: PrefixPolicy::AsNeeded,
            },
            messages_dir: None,
            static_dir: None,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
