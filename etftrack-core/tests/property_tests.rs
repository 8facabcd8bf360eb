//! Property tests for signal-engine and indicator invariants.
//!
//! Uses proptest to verify:
//! 1. KD oversold crossover below the low threshold always yields Buy
//! 2. KD overbought crossover above the high threshold always yields Sell
//! 3. K == D on T-1 never fires a KD rule
//! 4. MACD crossover yields Buy when no KD rule fired
//! 5. No crossover and RSI inside the band yields Hold
//! 6. RSI, %K and %D stay within [0, 100]

use chrono::NaiveDate;
use etftrack_core::domain::PriceBar;
use etftrack_core::indicators::{rsi_of_series, stochastic_of_bars, IndicatorSnapshot};
use etftrack_core::signal::{Rule, Signal, SignalEngine};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Snapshot with no crossovers and RSI mid-band.
fn neutral() -> IndicatorSnapshot {
    IndicatorSnapshot {
        date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        close: 100.0,
        k: 50.0,
        d: 50.0,
        macd: 0.4,
        macd_signal: 0.1,
        macd_hist: 0.3,
        rsi: 50.0,
        ma_short: 100.0,
        ma_long: 100.0,
    }
}

fn arb_oversold_pair() -> impl Strategy<Value = (f64, f64)> {
    // (k, d) with k < d < 20
    (0.0..19.0_f64, 0.01..1.0_f64).prop_map(|(k, gap)| (k, (k + gap).min(19.99)))
}

fn arb_closes(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, len)
}

fn bars_from(closes: &[f64]) -> Vec<PriceBar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume: 1_000,
            }
        })
        .collect()
}

// ── 1-3. KD crossovers ───────────────────────────────────────────────

proptest! {
    #[test]
    fn kd_oversold_cross_is_buy(
        (k_prev, d_prev) in arb_oversold_pair(),
        k_cur in 0.0..100.0_f64,
        spread in 0.01..50.0_f64,
    ) {
        let d_cur = (k_cur - spread).max(0.0);
        prop_assume!(k_cur > d_cur);
        prop_assume!(k_prev < d_prev);

        let prev = IndicatorSnapshot { k: k_prev, d: d_prev, ..neutral() };
        let cur = IndicatorSnapshot { k: k_cur, d: d_cur, ..neutral() };
        let decision = SignalEngine::default().decide(&prev, &cur);
        prop_assert_eq!(decision.signal, Signal::Buy);
        prop_assert_eq!(decision.rule, Some(Rule::KdOversoldCross));
    }

    #[test]
    fn kd_overbought_cross_is_sell(
        (k_low, d_low) in arb_oversold_pair(),
        k_cur in 0.0..100.0_f64,
        spread in 0.01..50.0_f64,
    ) {
        // Mirror the oversold pair into the overbought zone.
        let (k_prev, d_prev) = (100.0 - k_low, 100.0 - d_low);
        let d_cur = (k_cur + spread).min(100.0);
        prop_assume!(k_cur < d_cur);
        prop_assume!(k_prev > d_prev);

        let prev = IndicatorSnapshot { k: k_prev, d: d_prev, ..neutral() };
        let cur = IndicatorSnapshot { k: k_cur, d: d_cur, ..neutral() };
        let decision = SignalEngine::default().decide(&prev, &cur);
        prop_assert_eq!(decision.signal, Signal::Sell);
        prop_assert_eq!(decision.rule, Some(Rule::KdOverboughtCross));
    }

    #[test]
    fn kd_tie_never_fires_kd_rule(
        kd_prev in prop_oneof![0.0..20.0_f64, 80.01..100.0_f64],
        k_cur in 0.0..100.0_f64,
        d_cur in 0.0..100.0_f64,
    ) {
        let prev = IndicatorSnapshot { k: kd_prev, d: kd_prev, ..neutral() };
        let cur = IndicatorSnapshot { k: k_cur, d: d_cur, ..neutral() };
        let decision = SignalEngine::default().decide(&prev, &cur);
        prop_assert_ne!(decision.rule, Some(Rule::KdOversoldCross));
        prop_assert_ne!(decision.rule, Some(Rule::KdOverboughtCross));
    }
}

// ── 4-5. MACD crossover and default Hold ─────────────────────────────

proptest! {
    #[test]
    fn macd_cross_is_buy_without_kd_signal(
        signal_prev in -5.0..5.0_f64,
        below in 0.0..2.0_f64,
        signal_cur in -5.0..5.0_f64,
        above in 0.001..2.0_f64,
        rsi in 30.0..=70.0_f64,
    ) {
        let prev = IndicatorSnapshot {
            macd: signal_prev - below,
            macd_signal: signal_prev,
            rsi,
            ..neutral()
        };
        let cur = IndicatorSnapshot {
            macd: signal_cur + above,
            macd_signal: signal_cur,
            rsi,
            ..neutral()
        };
        let decision = SignalEngine::default().decide(&prev, &cur);
        prop_assert_eq!(decision.signal, Signal::Buy);
        prop_assert_eq!(decision.rule, Some(Rule::MacdBullishCross));
    }

    #[test]
    fn flat_indicators_hold(
        kd in 20.0..80.0_f64,
        macd in -5.0..5.0_f64,
        gap in 0.0..1.0_f64,
        rsi in 30.0..=70.0_f64,
    ) {
        // MACD stays above its signal line on both days: no cross either way.
        let snap = IndicatorSnapshot {
            k: kd,
            d: kd,
            macd: macd + gap + 0.001,
            macd_signal: macd,
            rsi,
            ..neutral()
        };
        let decision = SignalEngine::default().decide(&snap, &snap);
        prop_assert_eq!(decision.signal, Signal::Hold);
        prop_assert_eq!(decision.rule, None);
    }
}

// ── 6. Oscillator bounds ─────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_is_bounded(closes in arb_closes(60)) {
        for v in rsi_of_series(&closes, 14).into_iter().filter(|v| !v.is_nan()) {
            prop_assert!((0.0..=100.0).contains(&v), "RSI out of range: {}", v);
        }
    }

    #[test]
    fn stochastic_is_bounded(closes in arb_closes(60)) {
        let bars = bars_from(&closes);
        let (k, d) = stochastic_of_bars(&bars, 14, 3);
        for v in k.into_iter().chain(d).filter(|v| !v.is_nan()) {
            prop_assert!((-1e-9..=100.0 + 1e-9).contains(&v), "KD out of range: {}", v);
        }
    }
}
