//! Stochastic oscillator (KD).
//!
//! %K = 100 * (close - lowest low) / (highest high - lowest low) over `k_period` bars.
//! %D = SMA(`d_period`) of %K.
//! A zero high-low range yields %K = 50.
//! Lookback: k_period - 1 for %K, k_period + d_period - 2 for %D.

use super::sma::sma_of_series;
use super::Indicator;
use crate::domain::PriceBar;

/// Which stochastic line a `Stochastic` instance produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize, line: StochasticLine) -> Self {
        assert!(k_period >= 1, "stochastic %K period must be >= 1");
        assert!(d_period >= 1, "stochastic %D period must be >= 1");
        let suffix = match line {
            StochasticLine::K => "k",
            StochasticLine::D => "d",
        };
        Self {
            k_period,
            d_period,
            line,
            name: format!("stoch_{k_period}_{d_period}_{suffix}"),
        }
    }

    pub fn k(k_period: usize, d_period: usize) -> Self {
        Self::new(k_period, d_period, StochasticLine::K)
    }

    pub fn d(k_period: usize, d_period: usize) -> Self {
        Self::new(k_period, d_period, StochasticLine::D)
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            StochasticLine::K => self.k_period - 1,
            StochasticLine::D => self.k_period + self.d_period - 2,
        }
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let (k, d) = stochastic_of_bars(bars, self.k_period, self.d_period);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => d,
        }
    }
}

/// Compute %K and %D together.
pub fn stochastic_of_bars(
    bars: &[PriceBar],
    k_period: usize,
    d_period: usize,
) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut k = vec![f64::NAN; n];

    if k_period == 0 || n < k_period {
        return (k, vec![f64::NAN; n]);
    }

    for i in (k_period - 1)..n {
        let window = &bars[(i + 1 - k_period)..=i];
        let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let range = highest - lowest;
        k[i] = if range > 0.0 {
            100.0 * (bars[i].close - lowest) / range
        } else {
            50.0
        };
    }

    let d = sma_of_series(&k, d_period);
    (k, d)
}
