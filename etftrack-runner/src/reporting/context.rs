//! Values a report is rendered from.

use chrono::NaiveDate;
use serde::Serialize;

use etftrack_core::domain::PriceSeries;
use etftrack_core::indicators::IndicatorSnapshot;
use etftrack_core::signal::Decision;

use crate::chart::ChartPaths;
use crate::data_loader::DataOrigin;

/// Chart file names relative to the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartLinks {
    pub technical: String,
    pub summary: String,
}

impl ChartLinks {
    /// Reports live next to their charts, so a bare file name is enough.
    pub fn from_paths(paths: &ChartPaths) -> Self {
        let name = |p: &std::path::Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        Self {
            technical: name(&paths.technical),
            summary: name(&paths.summary),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    pub code: String,
    pub name: String,
    pub date: NaiveDate,
    pub close: f64,
    /// Change vs. the prior close; zero when there is no prior bar.
    pub change: f64,
    pub change_pct: f64,
    pub volume: u64,
    pub snapshot: IndicatorSnapshot,
    pub decision: Decision,
    pub charts: Option<ChartLinks>,
    pub origin: DataOrigin,
}

impl ReportContext {
    pub fn new(
        name: impl Into<String>,
        series: &PriceSeries,
        snapshot: IndicatorSnapshot,
        decision: Decision,
        charts: Option<ChartLinks>,
        origin: DataOrigin,
    ) -> Self {
        let last = series.latest();
        let (change, change_pct) = match series.previous() {
            Some(prev) if prev.close != 0.0 => {
                let change = last.close - prev.close;
                (change, change / prev.close * 100.0)
            }
            Some(prev) => (last.close - prev.close, 0.0),
            None => (0.0, 0.0),
        };
        Self {
            code: series.ticker().to_string(),
            name: name.into(),
            date: last.date,
            close: last.close,
            change,
            change_pct,
            volume: last.volume,
            snapshot,
            decision,
            charts,
            origin,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin.is_synthetic()
    }
}
