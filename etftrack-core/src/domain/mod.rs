//! Domain types for the ETF tracker

pub mod bar;

pub use bar::{PriceBar, PriceSeries, SeriesError};
