//! ETF registry — local ETF codes and the provider symbols behind them.
//!
//! Taiwan-listed ETFs are quoted on Yahoo under exchange suffixes that have
//! changed over time, so each code carries a primary symbol plus alternatives
//! tried in order when the primary comes back empty.
//!
//! The registry can be replaced with a TOML file:
//!
//! ```toml
//! [etfs."0050"]
//! name = "Yuanta Taiwan Top 50 ETF"
//! symbol = "0050.TW"
//! alternatives = ["0050.TWO"]
//! reference_price = 150.0
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use super::provider::DataError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("read registry file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse registry TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("registry defines no ETFs")]
    Empty,
}

/// One tracked ETF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfInfo {
    pub name: String,
    /// Primary provider symbol (e.g. `0050.TW`).
    pub symbol: String,
    /// Fallback provider symbols, tried in order.
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Typical price level, used as the starting point for synthetic sample data.
    #[serde(default = "default_reference_price")]
    pub reference_price: f64,
}

fn default_reference_price() -> f64 {
    100.0
}

/// Registry of supported ETF codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfRegistry {
    pub etfs: BTreeMap<String, EtfInfo>,
}

impl EtfRegistry {
    /// Load a registry from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a registry from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, RegistryError> {
        let registry: Self = toml::from_str(content)?;
        if registry.etfs.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(registry)
    }

    /// The default set of Taiwan ETFs.
    pub fn taiwan_default() -> Self {
        let mut etfs = BTreeMap::new();
        let mut add = |code: &str, name: &str, alternatives: &[&str], reference_price: f64| {
            etfs.insert(
                code.to_string(),
                EtfInfo {
                    name: name.to_string(),
                    symbol: format!("{code}.TW"),
                    alternatives: alternatives.iter().map(|s| s.to_string()).collect(),
                    reference_price,
                },
            );
        };

        add("0050", "Yuanta Taiwan Top 50 ETF", &["0050.TWO"], 150.0);
        add("006208", "Fubon FTSE Taiwan 50 ETF", &["6208.TW", "006208.TWO"], 20.0);
        add(
            "00878",
            "Cathay MSCI Taiwan ESG Sustainability High Dividend Yield ETF",
            &["0878.TW", "00878.TWO"],
            70.0,
        );
        add(
            "00929",
            "Fuh Hwa Taiwan Technology Dividend Highlight ETF",
            &["0929.TW", "00929.TWO"],
            25.0,
        );

        Self { etfs }
    }

    pub fn get(&self, code: &str) -> Option<&EtfInfo> {
        self.etfs.get(code)
    }

    /// Look up a code, failing with the list of supported codes.
    pub fn require(&self, code: &str) -> Result<&EtfInfo, DataError> {
        self.get(code).ok_or_else(|| DataError::UnknownCode {
            code: code.to_string(),
            supported: self.codes().join(", "),
        })
    }

    /// All supported codes, sorted.
    pub fn codes(&self) -> Vec<&str> {
        self.etfs.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for EtfRegistry {
    fn default() -> Self {
        Self::taiwan_default()
    }
}

impl EtfInfo {
    /// Primary symbol followed by alternatives, without duplicates.
    pub fn candidate_symbols(&self) -> Vec<&str> {
        let mut out: Vec<&str> = vec![self.symbol.as_str()];
        for alt in &self.alternatives {
            if !out.contains(&alt.as_str()) {
                out.push(alt);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_taiwan_etfs() {
        let reg = EtfRegistry::taiwan_default();
        assert_eq!(reg.codes(), vec!["0050", "006208", "00878", "00929"]);
        assert_eq!(reg.get("0050").unwrap().symbol, "0050.TW");
    }

    #[test]
    fn candidate_symbols_start_with_primary_and_dedupe() {
        let info = EtfInfo {
            name: "X".into(),
            symbol: "0050.TW".into(),
            alternatives: vec!["0050.TWO".into(), "0050.TW".into()],
            reference_price: 100.0,
        };
        assert_eq!(info.candidate_symbols(), vec!["0050.TW", "0050.TWO"]);
    }

    #[test]
    fn unknown_code_lists_supported() {
        let reg = EtfRegistry::taiwan_default();
        let err = reg.require("9999").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("9999"));
        assert!(msg.contains("0050"));
    }

    #[test]
    fn from_toml_parses_and_defaults() {
        let reg = EtfRegistry::from_toml(
            r#"
            [etfs.VTI]
            name = "Vanguard Total Stock Market"
            symbol = "VTI"
            "#,
        )
        .unwrap();
        let vti = reg.get("VTI").unwrap();
        assert!(vti.alternatives.is_empty());
        assert_eq!(vti.reference_price, 100.0);
    }

    #[test]
    fn from_toml_rejects_empty() {
        assert!(matches!(
            EtfRegistry::from_toml("[etfs]"),
            Err(RegistryError::Empty)
        ));
    }
}
