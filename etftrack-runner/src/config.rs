//! Application configuration.
//!
//! Loaded from TOML; every section has defaults so an empty file (or no file)
//! is a valid configuration. Environment overrides are applied after parsing:
//!
//! | Variable                    | Overrides                      |
//! |-----------------------------|--------------------------------|
//! | `ETFTRACK_TICKERS`          | `tickers` (comma-separated)    |
//! | `LINE_CHANNEL_ACCESS_TOKEN` | `notify.channel_access_token`  |
//! | `LINE_USER_IDS`             | `notify.user_ids` (comma-sep.) |
//!
//! ```toml
//! tickers = ["0050", "006208"]
//! history_days = 365
//! reports_dir = "reports"
//!
//! [signal]
//! rules = ["kd_oversold_cross", "kd_overbought_cross", "rsi_oversold"]
//!
//! [signal.thresholds]
//! kd_low = 20.0
//! kd_high = 80.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use etftrack_core::data::{EtfRegistry, RegistryError};
use etftrack_core::indicators::{IndicatorError, IndicatorParams};
use etftrack_core::signal::{Rule, SignalEngine, ThresholdError, Thresholds};

pub const DEFAULT_TICKERS: [&str; 2] = ["0050", "006208"];
pub const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid indicator settings: {0}")]
    Indicators(#[from] IndicatorError),

    #[error("invalid signal thresholds: {0}")]
    Thresholds(#[from] ThresholdError),

    #[error("ETF registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("unknown ETF code '{code}' (supported: {supported})")]
    UnknownTicker { code: String, supported: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration, passed explicitly into the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// ETF codes processed when none are given on the command line.
    pub tickers: Vec<String>,
    /// Calendar days of history to request.
    pub history_days: u32,
    pub reports_dir: PathBuf,
    /// Optional registry TOML replacing the built-in Taiwan ETF list.
    pub registry: Option<PathBuf>,
    /// Fall back to deterministic sample data when every provider symbol fails.
    pub synthetic_fallback: bool,
    pub indicators: IndicatorParams,
    pub signal: SignalConfig,
    pub charts: ChartConfig,
    pub notify: NotifyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect(),
            history_days: 365,
            reports_dir: PathBuf::from("reports"),
            registry: None,
            synthetic_fallback: false,
            indicators: IndicatorParams::default(),
            signal: SignalConfig::default(),
            charts: ChartConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalConfig {
    pub thresholds: Thresholds,
    /// Evaluation order; first matching rule wins.
    pub rules: Vec<Rule>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            rules: Rule::default_order(),
        }
    }
}

impl SignalConfig {
    pub fn engine(&self) -> Result<SignalEngine, ConfigError> {
        if self.rules.is_empty() {
            return Err(ConfigError::Invalid("signal.rules must not be empty".into()));
        }
        Ok(SignalEngine::new(self.rules.clone(), self.thresholds)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub enabled: bool,
    /// Bars shown on the technical chart.
    pub last_n_days: usize,
    /// Bars shown on the summary chart.
    pub summary_days: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            last_n_days: 180,
            summary_days: 60,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub channel_access_token: Option<String>,
    pub user_ids: Vec<String>,
    pub api_base: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel_access_token: None,
            user_ids: Vec::new(),
            api_base: DEFAULT_LINE_API_BASE.to_string(),
        }
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("enabled", &self.enabled)
            .field(
                "channel_access_token",
                &self.channel_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("user_ids", &self.user_ids)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl NotifyConfig {
    /// Token and recipients, if both are present.
    pub fn credentials(&self) -> Option<(&str, &[String])> {
        let token = self.channel_access_token.as_deref()?.trim();
        if token.is_empty() || self.user_ids.is_empty() {
            return None;
        }
        Some((token, &self.user_ids))
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    /// Parse a TOML file. Does not apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path` (or defaults), apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key/value source. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(tickers) = get("ETFTRACK_TICKERS") {
            self.tickers = split_list(&tickers);
        }
        if let Some(token) = get("LINE_CHANNEL_ACCESS_TOKEN") {
            self.notify.channel_access_token = Some(token.trim().to_string());
        }
        if let Some(ids) = get("LINE_USER_IDS") {
            self.notify.user_ids = split_list(&ids);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::Invalid("tickers must not be empty".into()));
        }
        if self.history_days == 0 {
            return Err(ConfigError::Invalid("history_days must be >= 1".into()));
        }
        if self.reports_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("reports_dir must not be empty".into()));
        }
        self.indicators.validate()?;
        self.signal.engine()?;
        if self.charts.last_n_days < 2 || self.charts.summary_days < 2 {
            return Err(ConfigError::Invalid(
                "charts.last_n_days and charts.summary_days must be >= 2".into(),
            ));
        }
        if self.notify.api_base.trim().is_empty() {
            return Err(ConfigError::Invalid("notify.api_base must not be empty".into()));
        }
        Ok(())
    }

    /// The configured registry file, or the built-in Taiwan ETF list.
    pub fn load_registry(&self) -> Result<EtfRegistry, ConfigError> {
        match &self.registry {
            Some(path) => Ok(EtfRegistry::from_file(path)?),
            None => Ok(EtfRegistry::taiwan_default()),
        }
    }

    /// Fail on the first code the registry does not know.
    pub fn check_tickers(codes: &[String], registry: &EtfRegistry) -> Result<(), ConfigError> {
        for code in codes {
            if registry.get(code).is_none() {
                return Err(ConfigError::UnknownTicker {
                    code: code.clone(),
                    supported: registry.codes().join(", "),
                });
            }
        }
        Ok(())
    }
}
