//! Price-series loading for one ETF code.
//!
//! Fallback policy:
//! 1. Fetch the registry's primary symbol (one attempt)
//! 2. On failure, try each alternative symbol in order (one attempt each)
//! 3. If every symbol failed and synthetic fallback is enabled → sample data (tagged)
//! 4. Otherwise → fail with every attempt's cause
//!
//! Synthetic data is a developer-only debug mode; reports built from it are
//! marked as such.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use etftrack_core::data::{sample_fetch, DataError, DataProvider, DataSource, EtfInfo};
use etftrack_core::domain::{PriceSeries, SeriesError};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data for '{code}' from any provider symbol ({})", .attempts.join("; "))]
    AllSymbolsFailed { code: String, attempts: Vec<String> },

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("invalid price series: {0}")]
    Series(#[from] SeriesError),
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Start date for bars (inclusive).
    pub start: NaiveDate,
    /// End date for bars (inclusive).
    pub end: NaiveDate,
    /// If true, generate sample bars when every provider symbol fails.
    pub synthetic: bool,
}

impl LoadOptions {
    /// `history_days` calendar days ending at `as_of`.
    pub fn ending(as_of: NaiveDate, history_days: u32, synthetic: bool) -> Self {
        Self {
            start: as_of - chrono::Duration::days(i64::from(history_days)),
            end: as_of,
            synthetic,
        }
    }
}

/// Where a loaded series came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataOrigin {
    Primary { symbol: String },
    Alternative { symbol: String },
    Synthetic,
}

impl DataOrigin {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, DataOrigin::Synthetic)
    }

    pub fn source(&self) -> DataSource {
        match self {
            DataOrigin::Synthetic => DataSource::Synthetic,
            _ => DataSource::YahooFinance,
        }
    }
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataOrigin::Primary { symbol } => write!(f, "Yahoo Finance ({symbol})"),
            DataOrigin::Alternative { symbol } => {
                write!(f, "Yahoo Finance, alternative symbol {symbol}")
            }
            DataOrigin::Synthetic => f.write_str("synthetic sample data"),
        }
    }
}

/// A validated series plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: PriceSeries,
    pub origin: DataOrigin,
}

/// Load the price series for one registry entry.
pub fn load_series(
    code: &str,
    info: &EtfInfo,
    provider: &dyn DataProvider,
    opts: &LoadOptions,
) -> Result<LoadedSeries, LoadError> {
    let mut attempts = Vec::new();

    for (i, symbol) in info.candidate_symbols().into_iter().enumerate() {
        debug!(ticker = code, symbol, provider = provider.name(), "fetching");

        let result = provider
            .fetch(symbol, opts.start, opts.end)
            .map_err(LoadError::from)
            .and_then(|fetched| Ok(PriceSeries::new(code, fetched.bars)?));

        match result {
            Ok(series) => {
                info!(ticker = code, symbol, bars = series.len(), "loaded price history");
                let origin = if i == 0 {
                    DataOrigin::Primary {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataOrigin::Alternative {
                        symbol: symbol.to_string(),
                    }
                };
                return Ok(LoadedSeries { series, origin });
            }
            Err(e) => {
                warn!(ticker = code, symbol, error = %e, "provider symbol failed");
                attempts.push(format!("{symbol}: {e}"));
            }
        }
    }

    if opts.synthetic {
        warn!(
            ticker = code,
            "generating synthetic data; the report will be tagged as synthetic"
        );
        let fetched = sample_fetch(code, opts.start, opts.end, info.reference_price);
        let series = PriceSeries::new(code, fetched.bars)?;
        return Ok(LoadedSeries {
            series,
            origin: DataOrigin::Synthetic,
        });
    }

    Err(LoadError::AllSymbolsFailed {
        code: code.to_string(),
        attempts,
    })
}
