//! Residential real-estate prices by French department
//!
//! Used to express the property value uplift of a solar installation
//! ("green value") in euros for a given home.

use std::collections::HashMap;

/// Price per m² by department code
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalPricing {
    /// Department code ("01", "2A", "75", ...) to average price (€/m²)
    price_per_m2: HashMap<String, f64>,

    /// Price used for departments missing from the table (€/m²)
    fallback_price_per_m2: f64,
}

impl RegionalPricing {
    /// Create from loaded CSV data
    pub fn from_loaded(prices: &HashMap<String, f64>, fallback_price_per_m2: f64) -> Self {
        Self {
            price_per_m2: prices
                .iter()
                .map(|(code, &price)| (normalize_department(code), price))
                .collect(),
            fallback_price_per_m2,
        }
    }

    /// Small built-in table covering the largest markets
    pub fn default_table() -> Self {
        let prices = [
            ("06", 5200.0),
            ("13", 3600.0),
            ("31", 3100.0),
            ("33", 3900.0),
            ("34", 3300.0),
            ("44", 3500.0),
            ("59", 2300.0),
            ("67", 2900.0),
            ("69", 4200.0),
            ("75", 10100.0),
            ("83", 4300.0),
            ("92", 6900.0),
        ];

        Self {
            price_per_m2: prices.iter().map(|(code, price)| (code.to_string(), *price)).collect(),
            fallback_price_per_m2: 2400.0,
        }
    }

    /// Price per m² for a department, if listed
    pub fn get(&self, department: &str) -> Option<f64> {
        self.price_per_m2.get(&normalize_department(department)).copied()
    }

    /// Price per m² for a department, falling back on the national figure
    pub fn price_or_fallback(&self, department: &str) -> f64 {
        self.get(department).unwrap_or(self.fallback_price_per_m2)
    }

    /// Number of departments in the table
    pub fn len(&self) -> usize {
        self.price_per_m2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.price_per_m2.is_empty()
    }

    /// Estimated property value increase for a home of `surface_m2`
    pub fn property_value_uplift(&self, department: &str, surface_m2: f64, uplift_percent: f64) -> f64 {
        if !surface_m2.is_finite() || surface_m2 <= 0.0 || !uplift_percent.is_finite() {
            return 0.0;
        }
        self.price_or_fallback(department) * surface_m2 * uplift_percent / 100.0
    }
}

impl Default for RegionalPricing {
    fn default() -> Self {
        Self::default_table()
    }
}

/// Canonical department code: trimmed, upper-case, two digits for 1..=9
fn normalize_department(code: &str) -> String {
    let code = code.trim().to_uppercase();
    if code.len() == 1 && code.chars().all(|c| c.is_ascii_digit()) {
        format!("0{}", code)
    } else {
        code
    }
}
