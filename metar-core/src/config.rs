use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::{model::StationCode, provider::ProviderId};

/// Used when the config does not set `timeout_secs`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-provider overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    /// Replaces the provider's public endpoint, e.g. for a mirror.
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Station shown when none is given on the command line.
    pub default_station: Option<String>,

    /// Provider id, "noaa" or "aviationweather".
    pub default_provider: Option<String>,

    /// HTTP timeout for one fetch, in seconds.
    pub timeout_secs: Option<u64>,

    /// Example TOML:
    /// [providers.noaa]
    /// base_url = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Configured default station, or `LFQQ`.
    pub fn default_station(&self) -> Result<StationCode> {
        match self.default_station.as_deref() {
            Some(code) => {
                StationCode::try_from(code).context("Invalid `default_station` in config file")
            }
            None => Ok(StationCode::default()),
        }
    }

    /// Return the default provider as a strongly-typed ProviderId, `noaa` when unset.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(id) => ProviderId::try_from(id),
            None => Ok(ProviderId::default()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }

    pub fn set_default_station(&mut self, station: &StationCode) {
        self.default_station = Some(station.to_string());
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    pub fn set_timeout_secs(&mut self, secs: u64) {
        self.timeout_secs = Some(secs);
    }

    /// Base URL override for a provider, if any.
    pub fn provider_base_url(&self, id: ProviderId) -> Option<&str> {
        self.providers
            .get(id.as_str())
            .and_then(|cfg| cfg.base_url.as_deref())
    }

    pub fn upsert_provider_base_url(&mut self, id: ProviderId, base_url: String) {
        let provider = self.providers.entry(id.as_str().to_string()).or_default();
        provider.base_url = Some(base_url);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "metar-decoder", "metar")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
