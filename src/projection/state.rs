//! Running totals carried from one projected year to the next

use super::amortization::saturate;
use super::cashflows::FinancingMode;

/// State of a financing scenario at the end of a projected year
#[derive(Debug, Clone)]
pub struct ProjectionState {
    pub mode: FinancingMode,

    /// Last completed year (0 before the first year)
    pub year: u32,

    /// Net position vs. doing nothing; starts at minus the initial outlay
    pub cumulative_savings: f64,

    /// Money spent on electricity without solar
    pub cumulative_spend_no_solar: f64,

    /// Money spent with solar, initial outlay included
    pub cumulative_spend_solar: f64,

    /// Price and buy-back indexation factor of the current year
    pub inflation_factor: f64,
}

impl ProjectionState {
    /// Year-0 state: the initial outlay has just been paid
    pub fn seed(mode: FinancingMode, initial_outlay: f64) -> Self {
        Self {
            mode,
            year: 0,
            cumulative_savings: -initial_outlay,
            cumulative_spend_no_solar: 0.0,
            cumulative_spend_solar: initial_outlay,
            inflation_factor: 1.0,
        }
    }

    /// Move to the next year, indexing prices on `inflation` (fraction)
    ///
    /// Year 1 uses a factor of exactly 1. A factor that stops being finite is
    /// held at its last finite value.
    pub fn advance_year(&mut self, inflation: f64) {
        if self.year > 0 {
            let next = self.inflation_factor * (1.0 + inflation);
            if next.is_finite() {
                self.inflation_factor = next;
            } else {
                log::warn!("inflation factor overflow in year {}, holding previous value", self.year + 1);
            }
        }
        self.year += 1;
    }

    /// Record the outcome of the current year
    ///
    /// Running totals saturate at the largest finite amount instead of
    /// overflowing.
    pub fn record(&mut self, bill_without_solar: f64, total_with_solar: f64, net_cashflow: f64) {
        self.cumulative_savings = saturate(self.cumulative_savings - net_cashflow);
        self.cumulative_spend_no_solar = saturate(self.cumulative_spend_no_solar + bill_without_solar);
        self.cumulative_spend_solar = saturate(self.cumulative_spend_solar + total_with_solar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_seed_folds_outlay() {
        let state = ProjectionState::seed(FinancingMode::Cash, 18_799.0);
        assert_eq!(state.year, 0);
        assert_eq!(state.cumulative_savings, -18_799.0);
        assert_eq!(state.cumulative_spend_solar, 18_799.0);
        assert_eq!(state.cumulative_spend_no_solar, 0.0);
    }

    #[test]
    fn test_inflation_factor_compounds_from_year_two() {
        let mut state = ProjectionState::seed(FinancingMode::Loan, 0.0);
        state.advance_year(0.05);
        assert_eq!(state.year, 1);
        assert_eq!(state.inflation_factor, 1.0);

        state.advance_year(0.05);
        state.advance_year(0.05);
        assert_eq!(state.year, 3);
        assert_relative_eq!(state.inflation_factor, 1.05_f64.powi(2), max_relative = 1e-12);
    }

    #[test]
    fn test_record_accumulates() {
        let mut state = ProjectionState::seed(FinancingMode::Loan, 1000.0);
        state.advance_year(0.0);
        state.record(2500.0, 1800.0, -700.0);
        assert_eq!(state.cumulative_savings, -300.0);
        assert_eq!(state.cumulative_spend_no_solar, 2500.0);
        assert_eq!(state.cumulative_spend_solar, 2800.0);
    }

    #[test]
    fn test_record_saturates() {
        let mut state = ProjectionState::seed(FinancingMode::Loan, 0.0);
        state.advance_year(0.0);
        state.record(f64::MAX, f64::MAX, f64::MAX);
        state.record(f64::MAX, f64::MAX, f64::MAX);

        assert_eq!(state.cumulative_savings, -f64::MAX);
        assert_eq!(state.cumulative_spend_no_solar, f64::MAX);
        assert_eq!(state.cumulative_spend_solar, f64::MAX);
    }
}
