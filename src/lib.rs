//! Solar Projection - financial projection engine for residential solar quotes
//!
//! This library provides:
//! - Loan amortization and borrower insurance
//! - Year-by-year cash-flow projection for loan and cash financing
//! - Headline KPIs (break-even, ROI, cost of waiting, bank-equivalent capital)
//! - Rule-based validation of projection output
//! - Study snapshots for the read-only client view

pub mod error;
pub mod params;
pub mod assumptions;
pub mod projection;
pub mod validation;
pub mod scenario;
pub mod snapshot;

// Re-export commonly used types
pub use error::LoadError;
pub use params::{RawSimulationParams, SimulationParams};
pub use assumptions::{Assumptions, MarketAssumptions, RegionalPricing};
pub use projection::{calculate, BreakEven, CalculationOutput, FinancingMode, ProjectionEngine, YearlyDetail};
pub use validation::{validate_all, ValidationReport};
pub use scenario::{QuoteSession, ScenarioRunner};
pub use snapshot::StudySnapshot;
