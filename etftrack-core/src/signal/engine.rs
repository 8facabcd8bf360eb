use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rules::Rule;
use super::{Decision, Signal};
use crate::indicators::{IndicatorError, IndicatorFrame, IndicatorSnapshot};

#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    #[error("{name} threshold {value} outside 0..=100")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("{name} low threshold ({low}) must be below high threshold ({high})")]
    Inverted {
        name: &'static str,
        low: f64,
        high: f64,
    },
}

/// Oversold / overbought levels for KD and RSI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    pub kd_low: f64,
    pub kd_high: f64,
    pub rsi_low: f64,
    pub rsi_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            kd_low: 20.0,
            kd_high: 80.0,
            rsi_low: 30.0,
            rsi_high: 70.0,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ThresholdError> {
        for (name, low, high) in [
            ("KD", self.kd_low, self.kd_high),
            ("RSI", self.rsi_low, self.rsi_high),
        ] {
            for value in [low, high] {
                // NaN fails the range check too.
                if !(0.0..=100.0).contains(&value) {
                    return Err(ThresholdError::OutOfRange { name, value });
                }
            }
            if low >= high {
                return Err(ThresholdError::Inverted { name, low, high });
            }
        }
        Ok(())
    }
}

/// Ordered rule list plus thresholds. First matching rule wins; no match is Hold.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEngine {
    rules: Vec<Rule>,
    thresholds: Thresholds,
}

impl SignalEngine {
    pub fn new(rules: Vec<Rule>, thresholds: Thresholds) -> Result<Self, ThresholdError> {
        thresholds.validate()?;
        Ok(Self { rules, thresholds })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn decide(&self, prev: &IndicatorSnapshot, cur: &IndicatorSnapshot) -> Decision {
        self.rules
            .iter()
            .find_map(|rule| {
                rule.evaluate(prev, cur, &self.thresholds)
                    .map(|signal| Decision {
                        signal,
                        rule: Some(*rule),
                    })
            })
            .unwrap_or_else(Decision::hold)
    }

    /// Decide on the last two bars of a frame.
    pub fn decide_frame(&self, frame: &IndicatorFrame) -> Result<Decision, IndicatorError> {
        let (prev, cur) = frame.latest_pair()?;
        Ok(self.decide(&prev, &cur))
    }

    /// Non-Hold decisions for every bar that has a defined predecessor, by bar index.
    /// Used to mark past signals on charts.
    pub fn history(&self, frame: &IndicatorFrame) -> Vec<(usize, Decision)> {
        let start = frame.warmup + 1;
        (start..frame.len())
            .filter_map(|i| {
                let prev = frame.snapshot(i - 1).ok()?;
                let cur = frame.snapshot(i).ok()?;
                let decision = self.decide(&prev, &cur);
                (decision.signal != Signal::Hold).then_some((i, decision))
            })
            .collect()
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self {
            rules: Rule::default_order(),
            thresholds: Thresholds::default(),
        }
    }
}
