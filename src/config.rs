//! Configuration management with validation and defaults
//!
//! `MinesConfig` is loaded from an optional TOML file, then overridden from
//! `MINES_*` environment variables, then validated.

use crate::errors::{ConfigurationError, MinesResult};
use crate::games::payout::PayoutScheduler;
use crate::games::session::GameRules;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MinesConfig {
    pub game: GameConfig,
    pub storage: StorageConfig,
    pub api: ApiConfig,
    pub monitoring: MonitoringConfig,
}

/// Wager rules and session lifetime
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub minimum_bet: f64,
    pub house_edge: f64,
    pub session_ttl_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            minimum_bet: 0.1,
            house_edge: 0.98,
            session_ttl_secs: 24 * 60 * 60,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "rocksdb" | "rocks" => Ok(StorageBackend::RocksDb),
            other => Err(ConfigurationError::InvalidValue {
                field: "storage.backend".to_string(),
                value: other.to_string(),
                reason: "expected 'memory' or 'rocksdb'".to_string(),
            }),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::RocksDb => write!(f, "rocksdb"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_directory: String,
    /// Upper bound for a single store call before it is reported as unavailable
    pub operation_timeout_ms: u64,
    pub sweep_interval_secs: u64,
    /// Whether to clear the database on startup (testing only!)
    pub clear_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_directory: "./DB/mines_sessions".to_string(),
            operation_timeout_ms: 2_000,
            sweep_interval_secs: 60,
            clear_on_start: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: Vec::new(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitoringConfig {
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset
    pub log_filter: String,
    pub enable_metrics: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_filter: "mines=info,tower_http=info".to_string(),
            enable_metrics: true,
        }
    }
}

impl MinesConfig {
    /// Local development: in-memory sessions, verbose logs
    pub fn development() -> Self {
        Self {
            monitoring: MonitoringConfig {
                log_filter: "mines=debug,tower_http=debug".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Named preset: `development` or `production`
    pub fn preset(name: &str) -> Result<Self, ConfigurationError> {
        match name {
            "development" => Ok(Self::development()),
            "production" => Ok(Self::production()),
            other => Err(invalid("preset", other, "expected development or production")),
        }
    }

    /// Persistent sessions listening on all interfaces
    pub fn production() -> Self {
        Self {
            storage: StorageConfig {
                backend: StorageBackend::RocksDb,
                clear_on_start: false,
                ..Default::default()
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let game = &self.game;
        if !game.minimum_bet.is_finite() || game.minimum_bet <= 0.0 {
            return Err(invalid("game.minimum_bet", game.minimum_bet, "must be a positive number"));
        }
        if !game.house_edge.is_finite() || game.house_edge <= 0.0 || game.house_edge > 1.0 {
            return Err(invalid("game.house_edge", game.house_edge, "must be in (0, 1]"));
        }
        if !PayoutScheduler::supports_house_edge(game.house_edge) {
            return Err(invalid(
                "game.house_edge",
                game.house_edge,
                "too small to produce increasing payout multipliers",
            ));
        }
        if game.session_ttl_secs == 0 {
            return Err(invalid("game.session_ttl_secs", 0, "Session TTL cannot be zero"));
        }
        // chrono rejects durations beyond i64 milliseconds
        if game.session_ttl_secs > i64::MAX as u64 / 1_000 {
            return Err(invalid("game.session_ttl_secs", game.session_ttl_secs, "Session TTL too large"));
        }

        if self.storage.operation_timeout_ms == 0 {
            return Err(invalid("storage.operation_timeout_ms", 0, "Timeout cannot be zero"));
        }
        if self.storage.sweep_interval_secs == 0 {
            return Err(invalid("storage.sweep_interval_secs", 0, "Sweep interval cannot be zero"));
        }
        if self.storage.backend == StorageBackend::RocksDb && self.storage.data_directory.is_empty() {
            return Err(ConfigurationError::ValidationFailed(
                "storage.data_directory is required for the rocksdb backend".to_string(),
            ));
        }

        if self.api.port == 0 {
            return Err(invalid("api.port", 0, "API port cannot be zero"));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(invalid("api.request_timeout_secs", 0, "Timeout cannot be zero"));
        }

        Ok(())
    }

    pub fn game_rules(&self) -> GameRules {
        GameRules {
            minimum_bet: self.game.minimum_bet,
            house_edge: self.game.house_edge,
            session_ttl: chrono::Duration::seconds(self.game.session_ttl_secs as i64),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.operation_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.storage.sweep_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_var<T: FromStr>(key: &str, value: String, reason: &str) -> Result<T, ConfigurationError> {
    value.parse().map_err(|_| invalid(key, value.clone(), reason))
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
    base: Option<MinesConfig>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Start from `base` instead of the defaults when no file is set
    pub fn with_base(mut self, base: MinesConfig) -> Self {
        self.base = Some(base);
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> MinesResult<MinesConfig> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as `load`, reading `MINES_*` variables through `lookup`
    pub fn load_with<F>(&self, lookup: F) -> MinesResult<MinesConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match (&self.config_path, &self.base) {
            (Some(path), _) => self.load_from_file(path)?,
            (None, Some(base)) => base.clone(),
            (None, None) => MinesConfig::default(),
        };

        apply_overrides(&mut config, lookup)?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> Result<MinesConfig, ConfigurationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)))
    }

    pub fn save(&self, config: &MinesConfig, path: &str) -> MinesResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

/// Apply `MINES_*` overrides using `lookup` to read variables
pub fn apply_overrides<F>(config: &mut MinesConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("MINES_API_HOST") {
        config.api.host = host;
    }
    if let Some(port) = lookup("MINES_API_PORT") {
        config.api.port = parse_var("MINES_API_PORT", port, "Invalid port number")?;
    }
    if let Some(bet) = lookup("MINES_MINIMUM_BET") {
        config.game.minimum_bet = parse_var("MINES_MINIMUM_BET", bet, "Invalid decimal")?;
    }
    if let Some(edge) = lookup("MINES_HOUSE_EDGE") {
        config.game.house_edge = parse_var("MINES_HOUSE_EDGE", edge, "Invalid decimal")?;
    }
    if let Some(backend) = lookup("MINES_STORAGE_BACKEND") {
        config.storage.backend = backend.parse()?;
    }
    if let Some(dir) = lookup("MINES_DATA_DIR") {
        config.storage.data_directory = dir;
    }
    if let Some(filter) = lookup("MINES_LOG_FILTER") {
        config.monitoring.log_filter = filter;
    }
    Ok(())
}
