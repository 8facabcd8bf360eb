//! Synthetic sample data.
//!
//! A deterministic random walk used when every provider symbol fails and the
//! run was started with synthetic fallback enabled. Reports built from this
//! data are tagged as synthetic.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataSource, FetchResult};
use crate::domain::PriceBar;

/// Generate weekday bars from `start` to `end` (inclusive), starting near `base_price`.
///
/// The RNG is seeded from the ticker code, so the same code and range always
/// produce the same bars.
pub fn generate_sample_bars(
    code: &str,
    start: NaiveDate,
    end: NaiveDate,
    base_price: f64,
) -> Vec<PriceBar> {
    let seed_bytes = blake3::hash(code.as_bytes());
    let seed: [u8; 32] = *seed_bytes.as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = base_price.max(1.0);
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        // Slight upward drift, roughly 1% daily volatility.
        let daily_return: f64 = rng.gen_range(-0.0175..0.0179);
        let open = price * (1.0 + rng.gen_range(-0.005..0.005));
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(50_000..5_000_000u64);

        bars.push(PriceBar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

/// Wrap sample bars as a fetch result so the pipeline treats them like any other source.
pub fn sample_fetch(code: &str, start: NaiveDate, end: NaiveDate, base_price: f64) -> FetchResult {
    FetchResult {
        symbol: format!("{code} (sample)"),
        bars: generate_sample_bars(code, start, end, base_price),
        source: DataSource::Synthetic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn sample_data_is_deterministic() {
        let a = generate_sample_bars("0050", jan(1), jan(31), 150.0);
        let b = generate_sample_bars("0050", jan(1), jan(31), 150.0);
        assert_eq!(a, b);
    }

    #[test]
    fn different_codes_get_different_data() {
        let a = generate_sample_bars("0050", jan(1), jan(31), 100.0);
        let b = generate_sample_bars("006208", jan(1), jan(31), 100.0);
        assert_eq!(a.len(), b.len());
        assert_ne!(a[0].close, b[0].close);
    }

    #[test]
    fn sample_bars_skip_weekends_and_are_sane() {
        let bars = generate_sample_bars("0050", jan(1), jan(31), 150.0);
        // January 2024 has 23 weekdays.
        assert_eq!(bars.len(), 23);
        for bar in &bars {
            assert!(!matches!(bar.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(bar.is_sane(), "insane sample bar: {bar:?}");
        }
    }

    #[test]
    fn sample_fetch_is_tagged() {
        let fetched = sample_fetch("0050", jan(1), jan(10), 150.0);
        assert_eq!(fetched.source, DataSource::Synthetic);
        assert!(!fetched.bars.is_empty());
    }
}
