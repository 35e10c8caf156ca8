//! Market assumptions and the regional pricing table injected into the engine

mod market;
mod pricing;
pub mod loader;

pub use market::{MarketAssumptions, SECONDS_PER_YEAR};
pub use pricing::RegionalPricing;
pub use loader::LoadedAssumptions;

use crate::error::LoadError;
use std::path::Path;

/// Container for all projection assumptions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assumptions {
    pub market: MarketAssumptions,
    pub regional_pricing: RegionalPricing,
}

impl Assumptions {
    /// Create assumptions with the built-in market values
    pub fn default_pricing() -> Self {
        Self {
            market: MarketAssumptions::default(),
            regional_pricing: RegionalPricing::default_table(),
        }
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> Result<Self, LoadError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, LoadError> {
        let loaded = LoadedAssumptions::load_from(path)?;

        let fallback = loaded
            .regional_pricing
            .get(loader::FALLBACK_DEPARTMENT)
            .copied()
            .unwrap_or_else(|| RegionalPricing::default_table().price_or_fallback(""));
        let mut prices = loaded.regional_pricing;
        prices.remove(loader::FALLBACK_DEPARTMENT);

        Ok(Self {
            market: MarketAssumptions::from_loaded(&loaded.market),
            regional_pricing: RegionalPricing::from_loaded(&prices, fallback),
        })
    }
}
