use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::limits::LimitsTable;
use crate::resolver::EntitlementResolver;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "BARBERBOSS_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "LimitsTable::builtin")]
    pub plans: LimitsTable,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plans: LimitsTable::builtin(),
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("barberboss")
            .join("plans.toml")
    }

    /// Loads from [`Settings::config_path`]. A missing file means the
    /// built-in plans; a broken one is an error, never a silent default.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No plans config at {}, using built-in table", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded plans config from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn into_resolver(self) -> Result<EntitlementResolver> {
        EntitlementResolver::new(self.plans)
    }
}
