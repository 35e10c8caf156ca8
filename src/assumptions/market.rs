//! Market constants used by the projection: buy-back tariff, bank reference rate

use std::collections::HashMap;

/// Seconds in a 365-day year
pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// Market-wide constants that are not part of a customer's quote
#[derive(Debug, Clone, PartialEq)]
pub struct MarketAssumptions {
    /// Surplus buy-back tariff in year 1 (€/kWh), indexed on inflation
    pub buyback_rate: f64,

    /// Rate of the low-risk reference savings account (%/yr)
    pub bank_reference_rate: f64,

    /// Property value uplift credited to a solar-equipped home (%)
    pub green_value_uplift: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            buyback_rate: 0.04,
            bank_reference_rate: 3.0,
            green_value_uplift: 3.0,
        }
    }
}

impl MarketAssumptions {
    /// Keys accepted in `market.csv`
    pub const KEYS: [&'static str; 3] = ["buyback_rate", "bank_reference_rate", "green_value_uplift"];

    /// Build from loaded key/value pairs; keys not present keep their defaults
    pub fn from_loaded(values: &HashMap<String, f64>) -> Self {
        let defaults = Self::default();
        let get = |key: &str, default: f64| values.get(key).copied().unwrap_or(default);

        Self {
            buyback_rate: get("buyback_rate", defaults.buyback_rate),
            bank_reference_rate: get("bank_reference_rate", defaults.bank_reference_rate),
            green_value_uplift: get("green_value_uplift", defaults.green_value_uplift),
        }
    }

    /// Bank reference rate as a fraction
    pub fn bank_reference_fraction(&self) -> f64 {
        self.bank_reference_rate / 100.0
    }
}
