//! Signal engine: latest indicator values → Buy / Sell / Hold.
//!
//! The engine is a pure function of two snapshots (day T-1 and day T). It
//! never reads prices directly and keeps no state between calls.

pub mod engine;
pub mod rules;

pub use engine::{SignalEngine, Thresholds, ThresholdError};
pub use rules::Rule;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn label(&self) -> &'static str {
        match self {
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
            Signal::Hold => "Hold",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one engine evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub signal: Signal,
    /// Rule that fired; `None` for the default Hold.
    pub rule: Option<Rule>,
}

impl Decision {
    pub fn hold() -> Self {
        Self {
            signal: Signal::Hold,
            rule: None,
        }
    }

    /// e.g. `Buy (KD oversold crossover)`, or plain `Hold`.
    pub fn label(&self) -> String {
        match self.rule {
            Some(rule) => format!("{} ({})", self.signal, rule.description()),
            None => self.signal.to_string(),
        }
    }
}
