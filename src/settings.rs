//! Engine settings with persistence
//!
//! Settings are saved to `~/.config/itemforge/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub log: LogSettings,
    pub catalog: CatalogSettings,
    pub runtime: RuntimeSettings,
    pub demo: DemoSettings,
}

impl EngineSettings {
    /// `settings.toml` under the platform config directory
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("itemforge").join("settings.toml"))
    }

    /// Load settings from disk; any problem falls back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::read_from(&path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring settings at {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    fn read_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).context("unreadable settings file")?;
        toml::from_str(&content).context("malformed settings file")
    }

    /// Write the current settings to the config directory
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.write_to(&path)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive, e.g. `info` or `itemforge_consume=debug`
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where item definitions come from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// TOML or JSON catalog; the built-in catalog is used when unset
    pub path: Option<PathBuf>,
}

/// Async runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Worker threads for timed recoveries
    pub worker_threads: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self { worker_threads: 2 }
    }
}

/// Scripted demo session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// Seed for upgrade rolls; entropy when unset
    pub seed: Option<u64>,
    pub character_level: u16,
    /// Jewels of bless/soul thrown at the demo sword
    pub upgrade_attempts: u32,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            seed: Some(7),
            character_level: 20,
            upgrade_attempts: 8,
        }
    }
}
