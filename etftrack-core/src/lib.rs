//! ETF Track Core — domain types, market data, indicators and the signal engine.
//!
//! This crate contains everything that does not touch the filesystem:
//! - Domain types (price bars, validated price series)
//! - Data providers (Yahoo Finance chart API, deterministic sample data)
//! - ETF registry (local codes → provider symbols)
//! - Indicator calculator (KD, MACD, RSI, moving averages)
//! - Signal engine (ordered rules → Buy / Sell / Hold)

pub mod data;
pub mod domain;
pub mod indicators;
pub mod signal;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared with the parallel runner are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::PriceBar>();
        require_sync::<domain::PriceBar>();
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();

        require_send::<data::EtfRegistry>();
        require_sync::<data::EtfRegistry>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();

        require_send::<indicators::IndicatorFrame>();
        require_sync::<indicators::IndicatorFrame>();
        require_send::<indicators::IndicatorSnapshot>();
        require_sync::<indicators::IndicatorSnapshot>();

        require_send::<signal::SignalEngine>();
        require_sync::<signal::SignalEngine>();
        require_send::<signal::Decision>();
        require_sync::<signal::Decision>();
    }

    /// Compile-time check: the engine takes snapshots, never raw bars.
    #[allow(dead_code)]
    fn signal_engine_only_sees_snapshots(
        engine: &signal::SignalEngine,
        prev: &indicators::IndicatorSnapshot,
        cur: &indicators::IndicatorSnapshot,
    ) -> signal::Decision {
        engine.decide(prev, cur)
    }
}
