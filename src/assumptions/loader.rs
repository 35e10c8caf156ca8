//! CSV-based assumption loader
//!
//! Loads market constants and the regional pricing table from data/assumptions/

use super::market::MarketAssumptions;
use crate::error::LoadError;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// Key used in regional_pricing.csv for the national fallback price
pub const FALLBACK_DEPARTMENT: &str = "*";

fn open(path: &Path) -> Result<csv::Reader<File>, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    Ok(csv::Reader::from_reader(file))
}

fn parse_value(key: &str, raw: &str) -> Result<f64, LoadError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LoadError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

/// Load market constants from CSV (key,value)
pub fn load_market(path: &Path) -> Result<HashMap<String, f64>, LoadError> {
    let file_path = path.join("market.csv");
    let mut reader = open(&file_path)?;

    let mut values = HashMap::new();

    for result in reader.records() {
        let record = result.map_err(|e| LoadError::csv(&file_path, e))?;
        let key = record.get(0).unwrap_or_default().trim().to_string();
        if !MarketAssumptions::KEYS.contains(&key.as_str()) {
            return Err(LoadError::UnknownKey { path: file_path, key });
        }
        let value = parse_value(&key, record.get(1).unwrap_or_default())?;
        values.insert(key, value);
    }

    Ok(values)
}

/// Load the price per m² table from CSV (department,price_per_m2)
pub fn load_regional_pricing(path: &Path) -> Result<HashMap<String, f64>, LoadError> {
    let file_path = path.join("regional_pricing.csv");
    let mut reader = open(&file_path)?;

    let mut prices = HashMap::new();

    for result in reader.records() {
        let record = result.map_err(|e| LoadError::csv(&file_path, e))?;
        let department = record.get(0).unwrap_or_default().trim().to_string();
        let price = parse_value(&department, record.get(1).unwrap_or_default())?;
        prices.insert(department, price);
    }

    Ok(prices)
}

/// All assumptions loaded from a directory
pub struct LoadedAssumptions {
    pub market: HashMap<String, f64>,
    pub regional_pricing: HashMap<String, f64>,
}

impl LoadedAssumptions {
    /// Load all assumptions from the default path
    pub fn load_default() -> Result<Self, LoadError> {
        Self::load_from(Path::new(DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load all assumptions from a specific path
    pub fn load_from(path: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            market: load_market(path)?,
            regional_pricing: load_regional_pricing(path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_assumptions() {
        let result = LoadedAssumptions::load_default();
        assert!(result.is_ok(), "Failed to load assumptions: {:?}", result.err());

        let assumptions = result.unwrap();
        assert!(assumptions.market.contains_key("buyback_rate"));
        assert!(assumptions.regional_pricing.len() >= 20);
        assert!(assumptions.regional_pricing.contains_key(FALLBACK_DEPARTMENT));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let result = LoadedAssumptions::load_from(Path::new("does/not/exist"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
