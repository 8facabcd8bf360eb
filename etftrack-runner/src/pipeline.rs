//! Per-ticker pipeline and run driver.
//!
//! fetch → export CSV → indicators and signal → charts → report → notify.
//! A failing stage aborts that ticker only; the run moves on to the next one
//! and the index page lists every outcome. Notification failures do not abort:
//! the report is already on disk by then.

use chrono::NaiveDate;
use rayon::prelude::*;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

use etftrack_core::data::{DataProvider, EtfRegistry};
use etftrack_core::indicators::{IndicatorError, IndicatorFrame};
use etftrack_core::signal::{Decision, SignalEngine};

use crate::chart::{write_charts, ChartInput, ChartPaths};
use crate::config::{AppConfig, ConfigError};
use crate::data_loader::{load_series, DataOrigin, LoadError, LoadOptions};
use crate::notify::{format_message, Notifier, NotifyError};
use crate::reporting::{
    ArtifactManager, ArtifactPaths, ChartLinks, HtmlReportGenerator, IndexEntry, IndexPage,
    ReportContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Export,
    Indicators,
    Charts,
    Report,
    Notify,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Export => "export",
            Stage::Indicators => "indicators",
            Stage::Charts => "charts",
            Stage::Report => "report",
            Stage::Notify => "notify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] LoadError),

    #[error("{0}")]
    InsufficientHistory(IndicatorError),

    #[error("render failure: {0:#}")]
    RenderFailure(anyhow::Error),

    #[error("notification failure: {0}")]
    NotificationFailure(#[from] NotifyError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    /// Notifications were not enabled for this run.
    NotRequested,
    /// Enabled but no notifier could be built (missing credentials).
    Skipped(String),
    Sent { recipients: usize },
    Failed(String),
}

#[derive(Debug)]
pub struct TickerReport {
    pub code: String,
    pub name: String,
    pub date: NaiveDate,
    pub close: f64,
    pub change_pct: f64,
    pub decision: Decision,
    pub origin: DataOrigin,
    pub artifacts: ArtifactPaths,
    pub charts: Option<ChartPaths>,
    pub notification: NotificationStatus,
}

#[derive(Debug)]
pub struct TickerFailure {
    pub code: String,
    pub stage: Stage,
    pub error: PipelineError,
}

#[derive(Debug)]
pub enum TickerOutcome {
    Completed(TickerReport),
    Failed(TickerFailure),
}

impl TickerOutcome {
    pub fn code(&self) -> &str {
        match self {
            TickerOutcome::Completed(r) => &r.code,
            TickerOutcome::Failed(f) => &f.code,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TickerOutcome::Failed(_))
    }
}

/// Outcomes in input order plus the index page result.
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<TickerOutcome>,
    pub index: Option<PathBuf>,
    pub index_error: Option<String>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &TickerFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            TickerOutcome::Failed(f) => Some(f),
            TickerOutcome::Completed(_) => None,
        })
    }

    pub fn reports(&self) -> impl Iterator<Item = &TickerReport> {
        self.outcomes.iter().filter_map(|o| match o {
            TickerOutcome::Completed(r) => Some(r),
            TickerOutcome::Failed(_) => None,
        })
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none() && self.index_error.is_none()
    }
}

/// One run's worth of wiring. Holds no mutable state, so tickers can be
/// processed concurrently.
pub struct Pipeline<'a> {
    config: &'a AppConfig,
    registry: &'a EtfRegistry,
    provider: &'a dyn DataProvider,
    notifier: Option<&'a dyn Notifier>,
    engine: SignalEngine,
    as_of: NaiveDate,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a AppConfig,
        registry: &'a EtfRegistry,
        provider: &'a dyn DataProvider,
        as_of: NaiveDate,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: config.signal.engine()?,
            config,
            registry,
            provider,
            notifier: None,
            as_of,
        })
    }

    pub fn with_notifier(mut self, notifier: &'a dyn Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    /// Run every code, sequentially or on the rayon pool. Outcomes keep input order.
    pub fn run(&self, codes: &[String], parallel: bool) -> RunSummary {
        let outcomes: Vec<TickerOutcome> = if parallel {
            codes.par_iter().map(|code| self.run_ticker(code)).collect()
        } else {
            codes.iter().map(|code| self.run_ticker(code)).collect()
        };

        let (index, index_error) = match self.write_index(&outcomes) {
            Ok(path) => (Some(path), None),
            Err(e) => {
                let message = format!("{e:#}");
                error!(stage = %Stage::Report, error = %message, "failed to write index page");
                (None, Some(message))
            }
        };

        RunSummary {
            outcomes,
            index,
            index_error,
        }
    }

    pub fn run_ticker(&self, code: &str) -> TickerOutcome {
        match self.process(code) {
            Ok(report) => {
                info!(
                    ticker = code,
                    signal = %report.decision.signal,
                    rule = report.decision.rule.map(|r| r.description()).unwrap_or("none"),
                    "ticker complete"
                );
                TickerOutcome::Completed(report)
            }
            Err(failure) => {
                error!(ticker = code, stage = %failure.stage, error = %failure.error, "ticker aborted");
                TickerOutcome::Failed(failure)
            }
        }
    }

    fn process(&self, code: &str) -> Result<TickerReport, TickerFailure> {
        let fail = |stage: Stage| {
            move |error: PipelineError| TickerFailure {
                code: code.to_string(),
                stage,
                error,
            }
        };

        // Fetch
        let info = self
            .registry
            .require(code)
            .map_err(|e| PipelineError::from(LoadError::from(e)))
            .map_err(fail(Stage::Fetch))?;
        let opts = LoadOptions::ending(
            self.as_of,
            self.config.history_days,
            self.config.synthetic_fallback,
        );
        let loaded = load_series(code, info, self.provider, &opts)
            .map_err(PipelineError::from)
            .map_err(fail(Stage::Fetch))?;
        let series = &loaded.series;
        let date = series.latest().date;

        // Export
        let artifacts = ArtifactManager::new(&self.config.reports_dir)
            .map_err(PipelineError::RenderFailure)
            .map_err(fail(Stage::Export))?;
        let prices_csv = artifacts
            .write_prices(code, date, series.bars())
            .map_err(PipelineError::RenderFailure)
            .map_err(fail(Stage::Export))?;

        // Indicators + signal
        let frame = IndicatorFrame::compute(series, self.config.indicators)
            .map_err(PipelineError::InsufficientHistory)
            .map_err(fail(Stage::Indicators))?;
        let (prev, latest) = frame
            .latest_pair()
            .map_err(PipelineError::InsufficientHistory)
            .map_err(fail(Stage::Indicators))?;
        let decision = self.engine.decide(&prev, &latest);

        // Charts
        let charts = if self.config.charts.enabled {
            let history = self.engine.history(&frame);
            let input = ChartInput {
                code,
                series,
                frame: &frame,
                decision: &decision,
                history: &history,
                thresholds: self.engine.thresholds(),
            };
            let paths = write_charts(&input, &self.config.charts, artifacts.dir(), date)
                .map_err(|e| PipelineError::RenderFailure(e.into()))
                .map_err(fail(Stage::Charts))?;
            Some(paths)
        } else {
            None
        };

        // Report
        let ctx = ReportContext::new(
            info.name.clone(),
            series,
            latest,
            decision.clone(),
            charts.as_ref().map(ChartLinks::from_paths),
            loaded.origin.clone(),
        );
        let html = HtmlReportGenerator.generate(&ctx);
        let report_html = artifacts
            .write_report(&ctx, &html)
            .map_err(PipelineError::RenderFailure)
            .map_err(fail(Stage::Report))?;
        let signal_json = artifacts
            .write_signal(&ctx)
            .map_err(PipelineError::RenderFailure)
            .map_err(fail(Stage::Export))?;

        let notification = self.notify(&ctx);

        Ok(TickerReport {
            code: code.to_string(),
            name: ctx.name,
            date,
            close: ctx.close,
            change_pct: ctx.change_pct,
            decision,
            origin: loaded.origin,
            artifacts: ArtifactPaths {
                prices_csv: Some(prices_csv),
                signal_json: Some(signal_json),
                report_html: Some(report_html),
            },
            charts,
            notification,
        })
    }

    fn notify(&self, ctx: &ReportContext) -> NotificationStatus {
        if !self.config.notify.enabled {
            return NotificationStatus::NotRequested;
        }
        let Some(notifier) = self.notifier else {
            warn!(
                ticker = %ctx.code,
                "notification requested but LINE credentials are not configured; skipping"
            );
            return NotificationStatus::Skipped("credentials not configured".into());
        };
        match notifier.send(&format_message(ctx)) {
            Ok(recipients) => NotificationStatus::Sent { recipients },
            Err(e) => {
                let e = PipelineError::from(e);
                warn!(
                    ticker = %ctx.code,
                    stage = %Stage::Notify,
                    notifier = notifier.name(),
                    error = %e,
                    "notification failed; report kept"
                );
                NotificationStatus::Failed(e.to_string())
            }
        }
    }

    fn write_index(&self, outcomes: &[TickerOutcome]) -> anyhow::Result<PathBuf> {
        let entries = outcomes
            .iter()
            .map(|outcome| match outcome {
                TickerOutcome::Completed(r) => IndexEntry::Report {
                    code: r.code.clone(),
                    name: r.name.clone(),
                    close: r.close,
                    change_pct: r.change_pct,
                    signal: r.decision.label(),
                    file: crate::reporting::artifacts::report_file_name(&r.code, r.date),
                    synthetic: r.origin.is_synthetic(),
                },
                TickerOutcome::Failed(f) => IndexEntry::Failed {
                    code: f.code.clone(),
                    stage: f.stage.to_string(),
                    error: f.error.to_string(),
                },
            })
            .collect();
        let page = IndexPage {
            date: self.as_of,
            entries,
        };
        ArtifactManager::new(&self.config.reports_dir)?.write_index(&page)
    }
}
