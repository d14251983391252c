use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level application configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Scan cadence, per-call timeouts and evaluation fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,
}

/// Location of the resolver that validates keys and reports collateralization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_endpoint")]
    pub endpoint: String,
}

/// Backing key-value store holding the subscriber sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_url")]
    pub url: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,
}

/// Delivery channel. Without an endpoint, alerts are printed to the terminal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
}

// --- Defaults ---

const MIN_INTERVAL_MS: u64 = 1_000;
const MIN_TIMEOUT_MS: u64 = 100;

const fn default_interval_ms() -> u64 {
    10 * 60 * 1000
}

const fn default_oracle_timeout_ms() -> u64 {
    10_000
}

const fn default_delivery_timeout_ms() -> u64 {
    5_000
}

const fn default_max_concurrent_checks() -> usize {
    8
}

fn default_oracle_endpoint() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_store_url() -> String {
    "redis://127.0.0.1/".into()
}

fn default_key_prefix() -> String {
    "depwatch:".into()
}

const fn default_scan_count() -> usize {
    100
}

// --- Default impls ---

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
            max_concurrent_checks: default_max_concurrent_checks(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_oracle_endpoint(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            key_prefix: default_key_prefix(),
            scan_count: default_scan_count(),
        }
    }
}

// --- Clamped accessors ---

impl ScannerConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_INTERVAL_MS))
    }

    #[must_use]
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms.max(MIN_TIMEOUT_MS))
    }

    #[must_use]
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms.max(MIN_TIMEOUT_MS))
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_checks.max(1)
    }
}

// --- AppConfig methods ---

impl AppConfig {
    /// Load config from default path or create default config file
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined,
    /// the file cannot be read, or the TOML content is invalid.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_or_create(&path)
    }

    /// Load from a specific path, or create a default config file if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is invalid,
    /// or the default config file cannot be written.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML content is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save config to a specific path, creating parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Override endpoints from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Override endpoints from any variable source; empty values are ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = get("REDIS_URL") {
            self.store.url = url;
        }
        if let Some(endpoint) = get("DEPWATCH_ORACLE_ENDPOINT") {
            self.oracle.endpoint = endpoint;
        }
        if let Some(endpoint) = get("DEPWATCH_NOTIFY_ENDPOINT") {
            self.notifications.endpoint = Some(endpoint);
        }
        self
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("depwatch").join("config.toml"))
    }
}
