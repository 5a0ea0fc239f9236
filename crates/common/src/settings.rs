use std::str;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use validator::Validate;

/// Configuration for the OneKey user-identity submodule.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OneKey {
    /// Enable/disable the submodule registration
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Configuration for the VisibleMeasures bid adapter.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VisibleMeasures {
    /// Enable/disable the adapter registration
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Ad-serving endpoint the adapter posts bid requests to
    #[serde(default = "default_ad_url")]
    #[validate(url)]
    pub ad_url: String,

    /// Base URL for user-sync assets
    #[serde(default = "default_sync_url")]
    #[validate(url)]
    pub sync_url: String,
}

fn default_enabled() -> bool {
    true
}

fn default_ad_url() -> String {
    "https://us-e.visiblemeasures.com/pbjs".to_string()
}

fn default_sync_url() -> String {
    "https://cs.visiblemeasures.com".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub onekey: OneKey,
    #[validate(nested)]
    pub visiblemeasures: VisibleMeasures,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let toml_bytes = include_bytes!("../../../prebid-modules.toml");
        let toml_str = str::from_utf8(toml_bytes)
            .map_err(|e| ConfigError::Message(format!("embedded config is not UTF-8: {e}")))?;

        Self::from_toml(toml_str)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let environment = Environment::default()
            .prefix("PREBID_MODULES")
            .separator("__");

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()?;

        // Deserialize (and thus freeze) the entire configuration, then
        // reject structurally valid but unusable values (bad URLs).
        let settings: Self = config.try_deserialize()?;
        settings
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(settings)
    }
}
