//! Decision rules.
//!
//! Each rule is a predicate over (T-1, T) snapshots paired with the signal it
//! emits. The engine walks an ordered list of rules; first match wins.

use serde::{Deserialize, Serialize};

use super::engine::Thresholds;
use super::Signal;
use crate::indicators::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// K and D both below the low threshold on T-1, K crosses above D.
    KdOversoldCross,
    /// K and D both above the high threshold on T-1, K crosses below D.
    KdOverboughtCross,
    MacdBullishCross,
    MacdBearishCross,
    RsiOversold,
    RsiOverbought,
    /// Short MA crosses above long MA.
    MaGoldenCross,
    /// Short MA crosses below long MA.
    MaDeathCross,
}

impl Rule {
    /// Rules evaluated when the configuration does not name any.
    pub fn default_order() -> Vec<Rule> {
        vec![
            Rule::KdOversoldCross,
            Rule::KdOverboughtCross,
            Rule::MacdBullishCross,
            Rule::MacdBearishCross,
            Rule::RsiOversold,
            Rule::RsiOverbought,
        ]
    }

    pub fn signal(&self) -> Signal {
        match self {
            Rule::KdOversoldCross
            | Rule::MacdBullishCross
            | Rule::RsiOversold
            | Rule::MaGoldenCross => Signal::Buy,
            Rule::KdOverboughtCross
            | Rule::MacdBearishCross
            | Rule::RsiOverbought
            | Rule::MaDeathCross => Signal::Sell,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rule::KdOversoldCross => "KD oversold crossover",
            Rule::KdOverboughtCross => "KD overbought crossover",
            Rule::MacdBullishCross => "MACD bullish crossover",
            Rule::MacdBearishCross => "MACD bearish crossover",
            Rule::RsiOversold => "RSI oversold",
            Rule::RsiOverbought => "RSI overbought",
            Rule::MaGoldenCross => "MA golden cross",
            Rule::MaDeathCross => "MA death cross",
        }
    }

    pub fn matches(
        &self,
        prev: &IndicatorSnapshot,
        cur: &IndicatorSnapshot,
        thresholds: &Thresholds,
    ) -> bool {
        match self {
            // Strict on both days: K == D on T-1 is not a cross.
            Rule::KdOversoldCross => {
                prev.k < thresholds.kd_low
                    && prev.d < thresholds.kd_low
                    && prev.k < prev.d
                    && cur.k > cur.d
            }
            Rule::KdOverboughtCross => {
                prev.k > thresholds.kd_high
                    && prev.d > thresholds.kd_high
                    && prev.k > prev.d
                    && cur.k < cur.d
            }
            Rule::MacdBullishCross => {
                prev.macd <= prev.macd_signal && cur.macd > cur.macd_signal
            }
            Rule::MacdBearishCross => {
                prev.macd >= prev.macd_signal && cur.macd < cur.macd_signal
            }
            Rule::RsiOversold => cur.rsi < thresholds.rsi_low,
            Rule::RsiOverbought => cur.rsi > thresholds.rsi_high,
            Rule::MaGoldenCross => prev.ma_short <= prev.ma_long && cur.ma_short > cur.ma_long,
            Rule::MaDeathCross => prev.ma_short >= prev.ma_long && cur.ma_short < cur.ma_long,
        }
    }

    /// The rule's signal if it matches, otherwise `None`.
    pub fn evaluate(
        &self,
        prev: &IndicatorSnapshot,
        cur: &IndicatorSnapshot,
        thresholds: &Thresholds,
    ) -> Option<Signal> {
        self.matches(prev, cur, thresholds).then(|| self.signal())
    }
}
