//! Moving Average Convergence/Divergence (MACD).
//!
//! MACD line = EMA(fast) - EMA(slow) of close, both SMA-seeded.
//! Signal line = EMA(signal) of the MACD line, seeded with the first MACD value.
//! Histogram = MACD line - signal line.
//! Lookback: slow - 1 for all three lines.

use super::ema::{ema_from_first, ema_of_series};
use super::Indicator;
use crate::domain::PriceBar;

/// Which MACD output a `Macd` instance produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow > fast, "MACD slow period must be > fast period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        let suffix = match line {
            MacdLine::Macd => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{fast}_{slow}_{signal}_{suffix}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Macd)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Signal)
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Histogram)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.slow - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let (line, signal, hist) = macd_of_series(&closes, self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Macd => line,
            MacdLine::Signal => signal,
            MacdLine::Histogram => hist,
        }
    }
}

/// Compute MACD line, signal line and histogram in one pass over the closes.
pub fn macd_of_series(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let fast_ema = ema_of_series(closes, fast);
    let slow_ema = ema_of_series(closes, slow);

    // NaN - x is NaN, so the warm-up of the slow EMA carries over.
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_from_first(&line, signal);
    let hist: Vec<f64> = line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    (line, signal_line, hist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn macd_small_periods_known_values() {
        // fast=2 (alpha 2/3), slow=3 (alpha 1/2), signal=2 (alpha 2/3)
        // closes 10, 12, 14, 13
        // fast: [NaN, 11, 13, 13]; slow: [NaN, NaN, 12, 12.5]
        // line: [NaN, NaN, 1, 0.5]
        // signal: [NaN, NaN, 1, 2/3*0.5 + 1/3*1 = 2/3]
        let bars = make_bars(&[10.0, 12.0, 14.0, 13.0]);
        let line = Macd::line(2, 3, 2).compute(&bars);
        let signal = Macd::signal(2, 3, 2).compute(&bars);
        let hist = Macd::histogram(2, 3, 2).compute(&bars);

        assert!(line[1].is_nan());
        assert_approx(line[2], 1.0, DEFAULT_EPSILON);
        assert_approx(line[3], 0.5, DEFAULT_EPSILON);
        assert!(signal[1].is_nan());
        assert_approx(signal[2], 1.0, DEFAULT_EPSILON);
        assert_approx(signal[3], 2.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(hist[2], 0.0, DEFAULT_EPSILON);
        assert_approx(hist[3], 0.5 - 2.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn macd_defined_from_slow_lookback() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let bars = make_bars(&closes);
        let macd = Macd::signal(12, 26, 9);
        let result = macd.compute(&bars);
        assert_eq!(macd.lookback(), 25);
        assert!(result[24].is_nan());
        assert!(!result[25].is_nan());
        assert!(result[25..].iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn macd_flat_prices_are_zero() {
        let bars = make_bars(&[50.0; 30]);
        let line = Macd::line(12, 26, 9).compute(&bars);
        let signal = Macd::signal(12, 26, 9).compute(&bars);
        assert_approx(line[29], 0.0, DEFAULT_EPSILON);
        assert_approx(signal[29], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn macd_names() {
        assert_eq!(Macd::line(12, 26, 9).name(), "macd_12_26_9_line");
        assert_eq!(Macd::histogram(12, 26, 9).name(), "macd_12_26_9_hist");
    }
}
