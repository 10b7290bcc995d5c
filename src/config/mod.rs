//! Configuration management for the parkwatch collector
//!
//! Configuration comes from a TOML file, from environment variables, or
//! from built-in defaults (the nine Aix-en-Provence SEMEPA facilities).
//! The facility set is fixed for the process lifetime once loaded.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::Facility;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fetcher configuration
    pub fetch: FetchConfig,

    /// Sweep scheduling configuration
    pub schedule: ScheduleConfig,

    /// Snapshot persistence configuration
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Tracked facilities, in sweep order
    pub facilities: Vec<Facility>,
}

/// Fetcher-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Hard per-request timeout in seconds
    pub timeout_secs: u64,

    /// Identifying User-Agent sent with every request
    pub user_agent: String,

    /// Pause between consecutive facility requests in milliseconds
    pub request_gap_ms: u64,
}

/// Sweep scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between background sweeps
    pub interval_secs: u64,

    /// Seconds to wait before the first background sweep
    pub warmup_secs: u64,

    /// IANA zone in which observation times are rendered. A deployment
    /// policy choice; defaults to the facilities' own zone.
    pub timezone: String,
}

/// Snapshot persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the snapshot and last-update artifacts
    pub data_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            user_agent: String::from(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            ),
            request_gap_ms: 500,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 600,
            warmup_secs: 0,
            timezone: String::from("Europe/Paris"),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            schedule: ScheduleConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
            facilities: default_facilities(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Sections and facilities may be omitted; omitted parts fall back to
    /// the built-in defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        if config.facilities.is_empty() {
            config.facilities = default_facilities();
        }

        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Scalar knobs come from `PARKWATCH_*` variables; the facility set is
    /// the built-in default.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_parse::<u64>("PARKWATCH_TIMEOUT_SECS") {
            config.fetch.timeout_secs = v;
        }
        if let Ok(v) = std::env::var("PARKWATCH_USER_AGENT") {
            config.fetch.user_agent = v;
        }
        if let Some(v) = env_parse::<u64>("PARKWATCH_REQUEST_GAP_MS") {
            config.fetch.request_gap_ms = v;
        }
        if let Some(v) = env_parse::<u64>("PARKWATCH_INTERVAL_SECS") {
            config.schedule.interval_secs = v;
        }
        if let Some(v) = env_parse::<u64>("PARKWATCH_WARMUP_SECS") {
            config.schedule.warmup_secs = v;
        }
        if let Ok(v) = std::env::var("PARKWATCH_TIMEZONE") {
            config.schedule.timezone = v;
        }
        if let Ok(v) = std::env::var("PARKWATCH_DATA_DIR") {
            config.store.data_dir = v.into();
        }
        if let Ok(v) = std::env::var("PARKWATCH_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("PARKWATCH_LOG_FORMAT") {
            config.logging.format = v;
        }

        Ok(config)
    }

    /// Load from an explicit file, from `config.toml` next to the process,
    /// or from the environment, in that order
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let local = Path::new("config.toml");
        if local.exists() {
            return Self::from_file(local);
        }

        Self::from_env()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than 0");
        }

        if self.schedule.interval_secs == 0 {
            anyhow::bail!("interval_secs must be greater than 0");
        }

        self.timezone()?;

        if self.facilities.is_empty() {
            anyhow::bail!("at least one facility must be configured");
        }

        let mut names = HashSet::new();
        for facility in &self.facilities {
            if !names.insert(facility.name.as_str()) {
                anyhow::bail!("duplicate facility name: {}", facility.name);
            }

            url::Url::parse(&facility.base_url).with_context(|| {
                format!(
                    "invalid base_url for facility {}: {}",
                    facility.name, facility.base_url
                )
            })?;
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Get the interval between background sweeps as Duration
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.interval_secs)
    }

    /// Get the warm-up delay before the first background sweep as Duration
    #[must_use]
    pub fn warmup(&self) -> Duration {
        Duration::from_secs(self.schedule.warmup_secs)
    }

    /// Parse the configured reference time zone
    pub fn timezone(&self) -> Result<Tz> {
        self.schedule
            .timezone
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("unknown timezone: {}", self.schedule.timezone))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse::<T>().ok())
}

/// The nine SEMEPA facilities in Aix-en-Provence
///
/// Page ids, capacities, and coordinates come from the operator's own
/// status pages.
pub fn default_facilities() -> Vec<Facility> {
    const MAMP: &str = "https://mamp.parkings-semepa.fr/";
    const MAIN: &str = "https://parkings-semepa.fr/";

    vec![
        Facility::new("Bellegarde", MAMP, 213, 340).with_coordinates(43.5322096, 5.4502100),
        Facility::new("Cardeurs", MAMP, 219, 125).with_coordinates(43.5298981, 5.4458118),
        Facility::new("Carnot", MAMP, 211, 675).with_coordinates(43.5255598, 5.4554612),
        Facility::new("Méjanes", MAMP, 150, 800).with_coordinates(43.5239974, 5.4413805),
        Facility::new("Mignet", MAMP, 209, 800).with_coordinates(43.52425, 5.4476974),
        Facility::new("Pasteur", MAMP, 215, 650).with_coordinates(43.5339951, 5.4462335),
        Facility::new("Rambot", MAIN, 221, 400).with_coordinates(43.5304833, 5.4580851),
        Facility::new("Rotonde", MAIN, 206, 1800).with_coordinates(43.5253922, 5.4440594),
        Facility::new("Signoret", MAMP, 217, 350).with_coordinates(43.5333509, 5.4486254),
    ]
}
