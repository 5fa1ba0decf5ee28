//! Configuration loading and management.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use showings_core::{
    GridError, OwnerId, PropertyId, SlotGrid, StaticDirectory,
    slot::{DEFAULT_DAY_END_HOUR, DEFAULT_DAY_START_HOUR, DEFAULT_STEP_MINUTES},
};
use showings_db::StoreConfig;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Owner identity handed over by the session service.
    #[serde(default)]
    pub owner: Option<String>,
    /// Owner → property ids, standing in for the external property service.
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Display grid for a scheduling day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub step_minutes: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            day_start_hour: DEFAULT_DAY_START_HOUR,
            day_end_hour: DEFAULT_DAY_END_HOUR,
            step_minutes: DEFAULT_STEP_MINUTES,
        }
    }
}

impl GridConfig {
    pub const fn slot_grid(&self) -> Result<SlotGrid, GridError> {
        SlotGrid::new(self.day_start_hour, self.day_end_hour, self.step_minutes)
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("showings.db"),
            owner: None,
            properties: BTreeMap::new(),
            grid: GridConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SHOWINGS_*, nested with __)
        figment = figment.merge(Env::prefixed("SHOWINGS_").split("__"));

        figment.extract()
    }

    /// The configured owner identity.
    pub fn owner_id(&self) -> Result<OwnerId> {
        let owner = self
            .owner
            .as_deref()
            .context("no owner configured; pass --owner or set `owner` in config")?;
        OwnerId::new(owner).context("invalid owner in configuration")
    }

    /// Builds the property directory from the `properties` table.
    pub fn directory(&self) -> Result<StaticDirectory> {
        let mut directory = StaticDirectory::new();
        for (owner, properties) in &self.properties {
            let owner = OwnerId::new(owner.as_str())
                .with_context(|| format!("invalid owner {owner:?} in properties"))?;
            for property in properties {
                let property = PropertyId::new(property.as_str())
                    .with_context(|| format!("invalid property {property:?} for {owner}"))?;
                directory.insert(owner.clone(), property);
            }
        }
        Ok(directory)
    }
}

/// Returns the platform-specific config directory for showings.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("showings"))
}

/// Returns the platform-specific data directory for showings.
///
/// On Linux: `~/.local/share/showings`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("showings"))
}
