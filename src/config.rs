use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// State backend configuration
    pub state: StateConfig,

    /// Classification engine configuration
    pub classification: ClassificationSettings,

    /// Report processing configuration
    pub processing: ProcessingConfig,

    /// Realtime event configuration
    pub realtime: RealtimeConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: CIVIC_IM_)
            .add_source(
                config::Environment::with_prefix("CIVIC_IM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            state: StateConfig::default(),
            classification: ClassificationSettings::default(),
            processing: ProcessingConfig::default(),
            realtime: RealtimeConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// State backend type
    #[serde(default)]
    pub backend: StateBackend,

    /// Path for the embedded database (sled)
    pub path: Option<PathBuf>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: StateBackend::Memory,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StateBackend {
    #[default]
    Memory,
    Sled,
}

/// Settings for the classification engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationSettings {
    /// Enable automatic classification of submitted reports
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Results below this confidence are flagged for manual review
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Predictor strategy: "keyword" or "uniform_random"
    #[serde(default)]
    pub predictor: PredictorKind,

    /// Optional RNG seed for reproducible fallback predictions
    pub rng_seed: Option<u64>,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: default_confidence_threshold(),
            predictor: PredictorKind::default(),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PredictorKind {
    #[default]
    Keyword,
    UniformRandom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Duplicate detection window (seconds)
    #[serde(default = "default_dedup_window")]
    pub deduplication_window_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            deduplication_window_secs: default_dedup_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Broadcast channel capacity
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus /metrics endpoint
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,

    /// Log level filter when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            prometheus_enabled: true,
            log_filter: default_log_filter(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_dedup_window() -> u64 {
    86_400
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_log_filter() -> String {
    "civic_issue_manager=info,tower_http=info".to_string()
}
