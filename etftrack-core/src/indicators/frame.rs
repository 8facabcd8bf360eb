//! Indicator frame and snapshots.
//!
//! `IndicatorFrame` holds every indicator series for one price series; the
//! plotter reads the full series, the signal engine only ever sees
//! `IndicatorSnapshot`s, which can only be built past the warm-up window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Indicator, Macd, Rsi, Sma, Stochastic};
use crate::domain::{PriceBar, PriceSeries};

#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    #[error("insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("invalid indicator parameters: {0}")]
    InvalidParams(String),

    #[error("bar index {index} out of range for {len} bars")]
    OutOfRange { index: usize, len: usize },
}

/// Indicator periods. Defaults: RSI 14, MACD 12/26/9, KD 14/3, MA 5/20.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub k_period: usize,
    pub d_period: usize,
    pub ma_short: usize,
    pub ma_long: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            k_period: 14,
            d_period: 3,
            ma_short: 5,
            ma_long: 20,
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), IndicatorError> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("k_period", self.k_period),
            ("d_period", self.d_period),
            ("ma_short", self.ma_short),
            ("ma_long", self.ma_long),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(IndicatorError::InvalidParams(format!("{name} must be >= 1")));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(IndicatorError::InvalidParams(format!(
                "macd_fast ({}) must be < macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if self.ma_short >= self.ma_long {
            return Err(IndicatorError::InvalidParams(format!(
                "ma_short ({}) must be < ma_long ({})",
                self.ma_short, self.ma_long
            )));
        }
        Ok(())
    }

    /// Build one indicator per frame column. Fails on invalid periods.
    pub fn indicators(&self) -> Result<FrameIndicators, IndicatorError> {
        self.validate()?;
        let (fast, slow, signal) = (self.macd_fast, self.macd_slow, self.macd_signal);
        Ok(FrameIndicators {
            k: Stochastic::k(self.k_period, self.d_period),
            d: Stochastic::d(self.k_period, self.d_period),
            macd: Macd::line(fast, slow, signal),
            macd_signal: Macd::signal(fast, slow, signal),
            macd_hist: Macd::histogram(fast, slow, signal),
            rsi: Rsi::new(self.rsi_period),
            ma_short: Sma::new(self.ma_short),
            ma_long: Sma::new(self.ma_long),
        })
    }

    /// Index of the first bar where every indicator is defined.
    pub fn warmup(&self) -> Result<usize, IndicatorError> {
        Ok(self.indicators()?.warmup())
    }

    /// Bars needed for a snapshot of the latest bar and the one before it.
    pub fn required_bars(&self) -> Result<usize, IndicatorError> {
        Ok(self.warmup()? + 2)
    }
}

/// The indicator instances behind each `IndicatorFrame` column.
#[derive(Debug, Clone)]
pub struct FrameIndicators {
    pub k: Stochastic,
    pub d: Stochastic,
    pub macd: Macd,
    pub macd_signal: Macd,
    pub macd_hist: Macd,
    pub rsi: Rsi,
    pub ma_short: Sma,
    pub ma_long: Sma,
}

impl FrameIndicators {
    pub fn all(&self) -> [&dyn Indicator; 8] {
        [
            &self.k,
            &self.d,
            &self.macd,
            &self.macd_signal,
            &self.macd_hist,
            &self.rsi,
            &self.ma_short,
            &self.ma_long,
        ]
    }

    /// Maximum lookback across all columns.
    pub fn warmup(&self) -> usize {
        self.all().iter().map(|i| i.lookback()).max().unwrap_or(0)
    }

    fn compute_column(indicator: &dyn Indicator, bars: &[PriceBar]) -> Vec<f64> {
        let series = indicator.compute(bars);
        debug_assert_eq!(
            series.len(),
            bars.len(),
            "indicator '{}' produced {} values for {} bars",
            indicator.name(),
            series.len(),
            bars.len()
        );
        series
    }
}

/// Indicator values for one bar. Every field is finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub k: f64,
    pub d: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub rsi: f64,
    pub ma_short: f64,
    pub ma_long: f64,
}

impl IndicatorSnapshot {
    fn values(&self) -> [f64; 9] {
        [
            self.close,
            self.k,
            self.d,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.rsi,
            self.ma_short,
            self.ma_long,
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.values().iter().all(|v| v.is_finite())
    }
}

/// Full indicator series for a price series, aligned bar-for-bar.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub params: IndicatorParams,
    /// Index of the first bar where every column is defined.
    pub warmup: usize,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_hist: Vec<f64>,
    pub rsi: Vec<f64>,
    pub ma_short: Vec<f64>,
    pub ma_long: Vec<f64>,
}

impl IndicatorFrame {
    /// Compute every indicator, failing up front if the series cannot produce
    /// snapshots for its last two bars.
    pub fn compute(series: &PriceSeries, params: IndicatorParams) -> Result<Self, IndicatorError> {
        let indicators = params.indicators()?;
        let warmup = indicators.warmup();

        let required = warmup + 2;
        if series.len() < required {
            return Err(IndicatorError::InsufficientHistory {
                required,
                available: series.len(),
            });
        }

        let bars = series.bars();
        let column = |indicator: &dyn Indicator| FrameIndicators::compute_column(indicator, bars);

        Ok(Self {
            params,
            warmup,
            dates: bars.iter().map(|b| b.date).collect(),
            closes: series.closes(),
            k: column(&indicators.k),
            d: column(&indicators.d),
            macd: column(&indicators.macd),
            macd_signal: column(&indicators.macd_signal),
            macd_hist: column(&indicators.macd_hist),
            rsi: column(&indicators.rsi),
            ma_short: column(&indicators.ma_short),
            ma_long: column(&indicators.ma_long),
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Snapshot at `index`, or `InsufficientHistory` if any indicator is still warming up.
    pub fn snapshot(&self, index: usize) -> Result<IndicatorSnapshot, IndicatorError> {
        if index >= self.len() {
            return Err(IndicatorError::OutOfRange {
                index,
                len: self.len(),
            });
        }

        let snap = IndicatorSnapshot {
            date: self.dates[index],
            close: self.closes[index],
            k: self.k[index],
            d: self.d[index],
            macd: self.macd[index],
            macd_signal: self.macd_signal[index],
            macd_hist: self.macd_hist[index],
            rsi: self.rsi[index],
            ma_short: self.ma_short[index],
            ma_long: self.ma_long[index],
        };

        if !snap.is_complete() {
            return Err(IndicatorError::InsufficientHistory {
                required: self.warmup + 1,
                available: index + 1,
            });
        }
        Ok(snap)
    }

    /// Snapshots for day T-1 and day T (the last two bars).
    pub fn latest_pair(&self) -> Result<(IndicatorSnapshot, IndicatorSnapshot), IndicatorError> {
        let n = self.len();
        if n < 2 {
            return Err(IndicatorError::InsufficientHistory {
                required: self.warmup + 2,
                available: n,
            });
        }
        Ok((self.snapshot(n - 2)?, self.snapshot(n - 1)?))
    }
}
