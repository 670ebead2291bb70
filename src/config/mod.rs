//! Configuration management for Guardex
//!
//! Configuration is an immutable snapshot loaded once per invocation and
//! threaded into the client at construction time; nothing here is global
//! mutable state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Default service endpoint template; `{region}` is substituted per call
pub const DEFAULT_API_HOST: &str = "https://guard.{region}.cloudsentry.io/api/v1";

/// Region whose endpoint serves the region-listing call
pub const DEFAULT_HOME_REGION: &str = "us-east-1";

/// Default geography prefix for region discovery
pub const DEFAULT_REGION_PREFIX: &str = "us-";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API bearer token for the threat-detection service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Endpoint URL template containing a `{region}` placeholder
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// Region whose endpoint serves region listing
    #[serde(default = "default_home_region")]
    pub home_region: String,

    /// Geography prefix used to discover applicable regions
    #[serde(default = "default_region_prefix")]
    pub region_prefix: String,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

fn default_home_region() -> String {
    DEFAULT_HOME_REGION.to_string()
}

fn default_region_prefix() -> String {
    DEFAULT_REGION_PREFIX.to_string()
}

/// User preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Default directory for export artifacts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_token: None,
            api_host: default_api_host(),
            home_region: default_home_region(),
            region_prefix: default_region_prefix(),
            preferences: Preferences::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".guardex").join("config.yaml"))
    }

    /// Resolve the config path from an optional override
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to an optional override path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // The token is a credential; keep the file private on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Require an API token, failing with setup guidance when missing.
    pub fn require_token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingApiToken.into())
    }
}
