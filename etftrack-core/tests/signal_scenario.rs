//! End-to-end scenario: price series → indicator frame → signal engine.
//!
//! The 30-bar fixture alternates 100/101 for sixteen bars, then steps down in
//! a zig-zag until bar 28 and rebounds on bar 29. On the last bar %K crosses
//! above %D from below 20 while RSI sits near 45, so the KD oversold rule
//! fires. Expected values were computed by hand from the indicator formulas.

use chrono::NaiveDate;
use etftrack_core::domain::{PriceBar, PriceSeries};
use etftrack_core::indicators::{IndicatorError, IndicatorFrame, IndicatorParams};
use etftrack_core::signal::{Rule, Signal, SignalEngine};

const TOLERANCE: f64 = 1e-6;

const CLOSES: [f64; 30] = [
    101.0, 100.0, 101.0, 100.0, 101.0, 100.0, 101.0, 100.0, 101.0, 100.0, 101.0, 100.0, 101.0,
    100.0, 101.0, 100.0, 98.8, 99.4, 98.2, 98.8, 97.6, 98.2, 97.0, 97.6, 96.4, 97.0, 95.8, 96.4,
    96.0, 97.3,
];

/// open = previous close, high/low one point outside the body.
fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 10_000 + i as u64,
            }
        })
        .collect()
}

fn assert_close(name: &str, actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "{name}: actual={actual}, expected={expected}, diff={}",
        (actual - expected).abs()
    );
}

#[test]
fn engineered_kd_cross_yields_buy() {
    let series = PriceSeries::new("TEST", bars(&CLOSES)).unwrap();
    let frame = IndicatorFrame::compute(&series, IndicatorParams::default()).unwrap();
    let (prev, cur) = frame.latest_pair().unwrap();

    // Day T-1: both lines deep in oversold territory, K below D.
    assert_close("K[T-1]", prev.k, 16.666_666_666_666_7);
    assert_close("D[T-1]", prev.d, 17.592_592_592_592_638);
    assert_close("RSI[T-1]", prev.rsi, 38.749_634_531_529_87);
    assert_close("MACD[T-1]", prev.macd, -1.493_946_856_527_756_5);
    assert_close("signal[T-1]", prev.macd_signal, -1.445_138_926_171_692_7);
    assert_close("MA5[T-1]", prev.ma_short, 96.32);
    assert_close("MA20[T-1]", prev.ma_long, 98.51);

    // Day T: highest high 101, lowest low 94.8 → K = 100 * 2.5 / 6.2.
    assert_close("K[T]", cur.k, 250.0 / 6.2);
    assert_close("D[T]", cur.d, 26.403_823_178_016_77);
    assert_close("RSI[T]", cur.rsi, 44.897_002_308_290_05);
    assert_close("MACD[T]", cur.macd, -1.383_220_269_936_572_3);
    assert_close("signal[T]", cur.macd_signal, -1.432_755_194_924_668_6);
    assert_close("MA5[T]", cur.ma_short, 96.5);
    assert_close("MA20[T]", cur.ma_long, 98.375);
    assert_close("close[T]", cur.close, 97.3);

    let decision = SignalEngine::default().decide_frame(&frame).unwrap();
    assert_eq!(decision.signal, Signal::Buy);
    // MACD also crosses up on T; the KD rule wins on priority.
    assert_eq!(decision.rule, Some(Rule::KdOversoldCross));
    assert_eq!(decision.label(), "Buy (KD oversold crossover)");
}

#[test]
fn without_kd_rule_macd_cross_decides() {
    let series = PriceSeries::new("TEST", bars(&CLOSES)).unwrap();
    let frame = IndicatorFrame::compute(&series, IndicatorParams::default()).unwrap();
    let engine = SignalEngine::new(
        vec![Rule::MacdBullishCross, Rule::MacdBearishCross],
        Default::default(),
    )
    .unwrap();
    let decision = engine.decide_frame(&frame).unwrap();
    assert_eq!(decision.signal, Signal::Buy);
    assert_eq!(decision.rule, Some(Rule::MacdBullishCross));
}

#[test]
fn series_shorter_than_macd_lookback_is_insufficient() {
    let series = PriceSeries::new("TEST", bars(&CLOSES[..25])).unwrap();
    let err = IndicatorFrame::compute(&series, IndicatorParams::default()).unwrap_err();
    assert_eq!(
        err,
        IndicatorError::InsufficientHistory {
            required: 27,
            available: 25
        }
    );
}

#[test]
fn one_snapshot_is_not_enough() {
    // 26 bars define every indicator on the last bar only.
    let series = PriceSeries::new("TEST", bars(&CLOSES[..26])).unwrap();
    assert!(matches!(
        IndicatorFrame::compute(&series, IndicatorParams::default()),
        Err(IndicatorError::InsufficientHistory {
            required: 27,
            available: 26
        })
    ));
}

#[test]
fn decision_is_deterministic() {
    let series = PriceSeries::new("TEST", bars(&CLOSES)).unwrap();
    let engine = SignalEngine::default();
    let a = engine
        .decide_frame(&IndicatorFrame::compute(&series, IndicatorParams::default()).unwrap())
        .unwrap();
    let b = engine
        .decide_frame(&IndicatorFrame::compute(&series.clone(), IndicatorParams::default()).unwrap())
        .unwrap();
    assert_eq!(a, b);
}
