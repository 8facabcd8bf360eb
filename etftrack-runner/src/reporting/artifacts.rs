//! Files written per ticker next to its report.
//!
//! - `<code>_<date>.csv`: fetched price history
//! - `<code>_signal_<date>.json`: latest indicators and signal
//! - `<code>_<date>.html`: the report
//!
//! plus one `index.html` per run.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use etftrack_core::domain::PriceBar;
use etftrack_core::signal::{Rule, Signal};

use super::context::ReportContext;
use super::index::IndexPage;

pub fn prices_file_name(code: &str, date: NaiveDate) -> String {
    format!("{code}_{date}.csv")
}

pub fn signal_file_name(code: &str, date: NaiveDate) -> String {
    format!("{code}_signal_{date}.json")
}

pub fn report_file_name(code: &str, date: NaiveDate) -> String {
    format!("{code}_{date}.html")
}

/// Price history as CSV with columns date, open, high, low, close, volume.
pub fn export_prices_csv(bars: &[PriceBar]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "open", "high", "low", "close", "volume"])?;
    for bar in bars {
        wtr.write_record([
            &bar.date.to_string(),
            &format!("{:.4}", bar.open),
            &format!("{:.4}", bar.high),
            &format!("{:.4}", bar.low),
            &format!("{:.4}", bar.close),
            &bar.volume.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Latest signal as persisted to `<code>_signal_<date>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub code: String,
    pub date: NaiveDate,
    pub close: f64,
    pub signal: Signal,
    pub rule: Option<Rule>,
    pub label: String,
    pub k: f64,
    pub d: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub rsi: f64,
    pub ma_short: f64,
    pub ma_long: f64,
    pub source: String,
    pub synthetic: bool,
}

impl SignalRecord {
    pub fn from_context(ctx: &ReportContext) -> Self {
        let s = &ctx.snapshot;
        Self {
            code: ctx.code.clone(),
            date: ctx.date,
            close: ctx.close,
            signal: ctx.decision.signal,
            rule: ctx.decision.rule,
            label: ctx.decision.label(),
            k: s.k,
            d: s.d,
            macd: s.macd,
            macd_signal: s.macd_signal,
            macd_hist: s.macd_hist,
            rsi: s.rsi,
            ma_short: s.ma_short,
            ma_long: s.ma_long,
            source: ctx.origin.to_string(),
            synthetic: ctx.is_synthetic(),
        }
    }
}

/// Paths written for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub prices_csv: Option<PathBuf>,
    pub signal_json: Option<PathBuf>,
    pub report_html: Option<PathBuf>,
}

/// Writes artifacts into one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create report directory {}", output_dir.display())
        })?;
        Ok(Self { output_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.output_dir
    }

    fn write(&self, file_name: &str, contents: &str, what: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {what} {}", path.display()))?;
        Ok(path)
    }

    pub fn write_prices(&self, code: &str, date: NaiveDate, bars: &[PriceBar]) -> Result<PathBuf> {
        let csv = export_prices_csv(bars)?;
        self.write(&prices_file_name(code, date), &csv, "price CSV")
    }

    pub fn write_signal(&self, ctx: &ReportContext) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(&SignalRecord::from_context(ctx))
            .context("Failed to serialize signal record")?;
        self.write(&signal_file_name(&ctx.code, ctx.date), &json, "signal JSON")
    }

    pub fn write_report(&self, ctx: &ReportContext, html: &str) -> Result<PathBuf> {
        self.write(&report_file_name(&ctx.code, ctx.date), html, "report")
    }

    pub fn write_index(&self, page: &IndexPage) -> Result<PathBuf> {
        self.write("index.html", &page.render(), "index page")
    }
}
