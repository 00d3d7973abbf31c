use crate::services::validation::RuleSet;
use memory_media::CloudinaryConfig;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG: &str = include_str!("../config/memories.toml");

/// Error while loading the configuration
#[derive(Debug)]
pub enum ConfigError {
    Parse(toml::de::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Folders {
    pub images: String,
    pub json: String,
    pub snapshots: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tags {
    pub image: String,
    pub json: String,
    pub snapshot: String,
}

/// Settings for uploads, hand-off and validation rules
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout")]
    pub upload_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub snapshot_enabled: bool,
    /// Action URL of the host form that receives the second submit
    #[serde(default)]
    pub handoff_action: String,
    pub folders: Folders,
    pub tags: Tags,
    #[serde(default)]
    pub rules: RuleSet,
}

fn default_api_base() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Embedded defaults overridden by `MEMORIES_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_toml(DEFAULT_CONFIG)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        log::debug!(
            "Config loaded: cloud={}, timeout={}s, tiles={}",
            config.cloud_name,
            config.upload_timeout_secs,
            config.rules.tile_count
        );
        Ok(config)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MEMORIES_CLOUD_NAME") {
            self.cloud_name = v;
        }
        if let Some(v) = lookup("MEMORIES_UPLOAD_PRESET") {
            self.upload_preset = v;
        }
        if let Some(v) = lookup("MEMORIES_HANDOFF_ACTION") {
            self.handoff_action = v;
        }
        if let Some(v) = lookup("MEMORIES_UPLOAD_TIMEOUT_SECS") {
            self.upload_timeout_secs = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("MEMORIES_UPLOAD_TIMEOUT_SECS={}", v)))?;
        }
        Ok(())
    }

    /// Both the cloud name and the preset are needed before anything is uploaded
    pub fn is_upload_configured(&self) -> bool {
        !self.cloud_name.trim().is_empty() && !self.upload_preset.trim().is_empty()
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs.max(1))
    }

    pub fn cloudinary(&self) -> CloudinaryConfig {
        CloudinaryConfig {
            api_base: self.api_base.clone(),
            cloud_name: self.cloud_name.trim().to_string(),
            upload_preset: self.upload_preset.trim().to_string(),
            timeout: self.upload_timeout(),
        }
    }
}
