//! Yearly cash-flow projection for loan and cash financing

mod state;
mod engine;
mod cashflows;
mod metrics;
mod output;
pub mod amortization;
pub mod irr;

pub use state::ProjectionState;
pub use engine::{calculate, ProjectionEngine};
pub use cashflows::{BreakEven, FinancingMode, ProjectionSeries, YearlyDetail};
pub use metrics::{
    bank_equivalent_capital, cost_of_inaction_per_second, roi_percentage, AggregateMetrics,
    ScenarioPair, ScenarioSummary, YearOneSnapshot,
};
pub use output::{CalculationOutput, EnergySplit};
pub use amortization::{monthly_insurance, monthly_payment, LoanTerms};
pub use irr::internal_rate_of_return;
