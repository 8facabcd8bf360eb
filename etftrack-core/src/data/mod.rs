//! Market data: provider trait, Yahoo Finance client, ETF registry, sample data

pub mod provider;
pub mod registry;
pub mod synthetic;
pub mod yahoo;

pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use registry::{EtfInfo, EtfRegistry, RegistryError};
pub use synthetic::{generate_sample_bars, sample_fetch};
pub use yahoo::YahooProvider;
