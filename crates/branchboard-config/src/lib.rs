//! Configuration management for branchboard
//!
//! This module handles loading, validation, and management of
//! branchboard configuration from YAML files. It also owns the
//! report vocabulary shared by every crate: bucket frequencies and
//! the metrics a comparison can plot.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Report Vocabulary ====================

/// Time-bucket frequency of a report entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Weekly
    }
}

impl Frequency {
    /// The sub-bucket frequency used to build one axis per coarse bucket.
    pub fn finer(self) -> Frequency {
        match self {
            Frequency::Weekly => Frequency::Daily,
            Frequency::Monthly => Frequency::Weekly,
            Frequency::Yearly => Frequency::Monthly,
            other => other,
        }
    }

    /// Whether the dashboard offers this frequency in its selector.
    /// Hourly is accepted everywhere but never offered.
    pub fn selectable(self) -> bool {
        !matches!(self, Frequency::Hourly)
    }

    /// Spanish label shown in the frequency selector
    pub fn label(self) -> &'static str {
        match self {
            Frequency::Hourly => "Por hora",
            Frequency::Daily => "Diario",
            Frequency::Weekly => "Semanal",
            Frequency::Monthly => "Mensual",
            Frequency::Yearly => "Anual",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hourly" => Ok(Frequency::Hourly),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(format!("Invalid frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Hourly => write!(f, "hourly"),
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Yearly => write!(f, "yearly"),
        }
    }
}

/// Metric plotted on a comparison chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Currency sold (`totalSales` / `salesByCategory`)
    Sales,
    /// Units sold (`totalSold` / `quantitiesByCategory`)
    Quantity,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Sales
    }
}

impl std::str::FromStr for Metric {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sales" | "ventas" => Ok(Metric::Sales),
            "quantity" | "cantidad" => Ok(Metric::Quantity),
            _ => Err(format!("Invalid metric: {}", s)),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Sales => write!(f, "sales"),
            Metric::Quantity => write!(f, "quantity"),
        }
    }
}

// ==================== Configuration Types ====================

/// Reporting API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the reporting API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Fallback label prefixes for ids missing from the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_branch_prefix")]
    pub branch_prefix: String,
    #[serde(default = "default_category_prefix")]
    pub category_prefix: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            branch_prefix: default_branch_prefix(),
            category_prefix: default_category_prefix(),
        }
    }
}

fn default_branch_prefix() -> String {
    "Sucursal".to_string()
}

fn default_category_prefix() -> String {
    "Categoría".to_string()
}

/// Initial comparison filter settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComparisonConfig {
    /// Default bucket frequency
    #[serde(default)]
    pub frequency: Frequency,
    /// Default plotted metric
    #[serde(default)]
    pub metric: Metric,
    /// Start in continuous view mode
    #[serde(default = "default_false")]
    pub continuous: bool,
}

fn default_false() -> bool {
    false
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Reporting API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Fallback label settings
    #[serde(default)]
    pub labels: LabelConfig,
    /// Comparison defaults
    #[serde(default)]
    pub comparison: ComparisonConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.labels.branch_prefix.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "labels.branch_prefix".to_string(),
            });
        }

        if self.labels.category_prefix.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "labels.category_prefix".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// API base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}
