//! Cache configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("max_files must be greater than zero")]
    ZeroCapacity,
    #[error("{0} must be greater than zero")]
    ZeroTtl(&'static str),
}

/// Expiry and capacity settings for the two cache levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a single dependency result, from write.
    pub report_ttl_secs: u64,
    /// Lifetime of a file's report cache, from creation.
    pub file_ttl_secs: u64,
    /// Maximum number of files tracked at once.
    pub max_files: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            report_ttl_secs: 60,
            file_ttl_secs: 50 * 60,
            max_files: 100,
        }
    }
}

impl CacheConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CacheConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!("Loaded cache config from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_files == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.report_ttl_secs == 0 {
            return Err(ConfigError::ZeroTtl("report_ttl_secs"));
        }
        if self.file_ttl_secs == 0 {
            return Err(ConfigError::ZeroTtl("file_ttl_secs"));
        }
        Ok(())
    }

    pub fn report_ttl(&self) -> Duration {
        Duration::from_secs(self.report_ttl_secs)
    }

    pub fn file_ttl(&self) -> Duration {
        Duration::from_secs(self.file_ttl_secs)
    }
}
