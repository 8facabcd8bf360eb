//! ETF Track Runner — configuration, loading policy, charts, reports and the
//! per-ticker pipeline.
//!
//! This crate builds on `etftrack-core` to provide:
//! - TOML configuration with environment overrides
//! - Data loading with alternative-symbol and synthetic fallback
//! - SVG chart rendering (technical + summary)
//! - HTML report, index page, price CSV and signal JSON export
//! - LINE push notifications
//! - The pipeline driver with per-ticker failure isolation

pub mod chart;
pub mod config;
pub mod data_loader;
pub mod notify;
pub mod pipeline;
pub mod reporting;

pub use chart::{ChartError, ChartInput, ChartPaths};
pub use config::{AppConfig, ChartConfig, ConfigError, NotifyConfig, SignalConfig};
pub use data_loader::{load_series, DataOrigin, LoadError, LoadOptions, LoadedSeries};
pub use notify::{format_message, LineNotifier, Notifier, NotifyError};
pub use pipeline::{
    NotificationStatus, Pipeline, PipelineError, RunSummary, Stage, TickerFailure, TickerOutcome,
    TickerReport,
};
pub use reporting::{ArtifactManager, ArtifactPaths, HtmlReportGenerator, ReportContext};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<AppConfig>();
        assert_sync::<AppConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn pipeline_is_sync() {
        assert_sync::<Pipeline<'static>>();
    }

    #[test]
    fn outcomes_cross_threads() {
        assert_send::<TickerOutcome>();
        assert_send::<PipelineError>();
        assert_sync::<PipelineError>();
    }

    #[test]
    fn line_notifier_is_send_sync() {
        assert_send::<LineNotifier>();
        assert_sync::<LineNotifier>();
    }
}
