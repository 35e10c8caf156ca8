//! Scalar KPIs derived from the yearly series

use serde::{Deserialize, Serialize};

use super::amortization::LoanTerms;
use super::cashflows::{BreakEven, FinancingMode, ProjectionSeries};
use super::irr::internal_rate_of_return;
use crate::assumptions::{MarketAssumptions, SECONDS_PER_YEAR};
use crate::params::SimulationParams;

/// Headline KPIs of a quote; the loan scenario is the headline one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub break_even: BreakEven,
    pub break_even_cash: BreakEven,

    /// Average yearly gain over the install cost (%); not clamped
    pub roi_percentage: f64,

    /// Cumulative savings at the end of the horizon (loan)
    pub total_savings_projected: f64,
    pub total_savings_projected_cash: f64,

    /// `total_savings_projected / horizon`
    pub average_yearly_gain: f64,

    /// Electricity bill of one more year without solar
    pub loss_if_wait_1_year: f64,

    /// Year-1 cumulative savings of acting now
    pub savings_lost_if_wait_1_year: f64,

    /// Capital a reference savings account would need to earn `average_yearly_gain` each year
    pub bank_equivalent_capital: f64,

    /// Current electricity spend per second, for the live counter
    pub cost_of_inaction_per_second: f64,

    /// Yearly IRR of paying cash (%), when it exists
    pub irr_percentage_cash: Option<f64>,
}

/// "What you'd pay this month" figures for the first year (loan scenario)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOneSnapshot {
    pub monthly_bill_without_solar: f64,
    pub monthly_credit_payment: f64,
    pub monthly_insurance: f64,
    pub monthly_residual_bill: f64,
    pub monthly_surplus_revenue: f64,
    pub monthly_savings_from_self_use: f64,
    pub monthly_total_with_solar: f64,

    /// Extra money out of pocket each month vs. no solar (negative = saving)
    pub monthly_effort: f64,
}

/// Outcome of one financing scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub mode: FinancingMode,
    pub initial_outlay: f64,
    pub total_savings: f64,
    pub break_even: BreakEven,
    pub roi_percentage: f64,
    pub total_spend_no_solar: f64,
    pub total_spend_solar: f64,
}

/// Loan and cash scenarios side by side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPair {
    pub loan: ScenarioSummary,
    pub cash: ScenarioSummary,
}

impl ScenarioPair {
    /// Savings advantage of paying cash over borrowing at the horizon
    pub fn cash_advantage(&self) -> f64 {
        self.cash.total_savings - self.loan.total_savings
    }
}

fn finite_or_zero(name: &str, value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        log::warn!("{} is not finite ({}), reporting 0", name, value);
        0.0
    }
}

/// `(total / horizon) / install_cost * 100`, 0 when either divisor is not positive
pub fn roi_percentage(total_savings: f64, horizon: u32, install_cost: f64) -> f64 {
    if horizon == 0 || install_cost <= 0.0 {
        return 0.0;
    }
    finite_or_zero("roi_percentage", total_savings / horizon as f64 / install_cost * 100.0)
}

/// Capital earning `yearly_gain` per year at `reference_rate_percent`
pub fn bank_equivalent_capital(yearly_gain: f64, reference_rate_percent: f64) -> f64 {
    if yearly_gain <= 0.0 || reference_rate_percent <= 0.0 {
        return 0.0;
    }
    finite_or_zero("bank_equivalent_capital", yearly_gain / (reference_rate_percent / 100.0))
}

/// Current electricity spend per second
pub fn cost_of_inaction_per_second(annual_consumption: f64, price_per_kwh: f64) -> f64 {
    finite_or_zero(
        "cost_of_inaction_per_second",
        annual_consumption * price_per_kwh / SECONDS_PER_YEAR,
    )
}

impl ScenarioSummary {
    pub fn from_series(series: &ProjectionSeries, params: &SimulationParams) -> Self {
        let total_savings = series.final_cumulative_savings();
        let last = series.last();

        Self {
            mode: series.mode,
            initial_outlay: series.initial_outlay,
            total_savings,
            break_even: series.break_even(),
            roi_percentage: roi_percentage(total_savings, params.projection_years, params.install_cost),
            total_spend_no_solar: last.map(|d| d.cumulative_spend_no_solar).unwrap_or(0.0),
            total_spend_solar: last
                .map(|d| d.cumulative_spend_solar)
                .unwrap_or(series.initial_outlay),
        }
    }
}

impl AggregateMetrics {
    /// Reduce both series into the headline KPIs
    pub fn derive(
        params: &SimulationParams,
        market: &MarketAssumptions,
        loan: &ProjectionSeries,
        cash: &ProjectionSeries,
    ) -> Self {
        let horizon = params.projection_years;
        let total_savings_projected = loan.final_cumulative_savings();
        let average_yearly_gain = if horizon > 0 {
            total_savings_projected / horizon as f64
        } else {
            0.0
        };

        let first = loan.first();

        Self {
            break_even: loan.break_even(),
            break_even_cash: cash.break_even(),
            roi_percentage: roi_percentage(total_savings_projected, horizon, params.install_cost),
            total_savings_projected,
            total_savings_projected_cash: cash.final_cumulative_savings(),
            average_yearly_gain,
            loss_if_wait_1_year: first.map(|d| d.bill_without_solar).unwrap_or(0.0),
            savings_lost_if_wait_1_year: first.map(|d| d.cumulative_savings).unwrap_or(0.0),
            bank_equivalent_capital: bank_equivalent_capital(average_yearly_gain, market.bank_reference_rate),
            cost_of_inaction_per_second: cost_of_inaction_per_second(
                params.annual_consumption,
                params.electricity_price,
            ),
            irr_percentage_cash: internal_rate_of_return(&cash.investment_flows())
                .map(|r| r * 100.0)
                .filter(|r| r.is_finite()),
        }
    }
}

impl YearOneSnapshot {
    /// Monthly view of year 1 of `series`
    pub fn from_series(series: &ProjectionSeries, terms: &LoanTerms) -> Self {
        let Some(first) = series.first() else {
            return Self::empty();
        };

        let credit_running = series.mode == FinancingMode::Loan && terms.covers_year(1);
        let (monthly_credit_payment, monthly_insurance) = if credit_running {
            (terms.monthly_payment, terms.monthly_insurance)
        } else {
            (0.0, 0.0)
        };

        Self {
            monthly_bill_without_solar: first.bill_without_solar / 12.0,
            monthly_credit_payment,
            monthly_insurance,
            monthly_residual_bill: first.residual_bill / 12.0,
            monthly_surplus_revenue: first.surplus_revenue / 12.0,
            monthly_savings_from_self_use: first.savings_from_self_use / 12.0,
            monthly_total_with_solar: first.total_with_solar / 12.0,
            monthly_effort: first.net_cashflow_vs_baseline / 12.0,
        }
    }

    fn empty() -> Self {
        Self {
            monthly_bill_without_solar: 0.0,
            monthly_credit_payment: 0.0,
            monthly_insurance: 0.0,
            monthly_residual_bill: 0.0,
            monthly_surplus_revenue: 0.0,
            monthly_savings_from_self_use: 0.0,
            monthly_total_with_solar: 0.0,
            monthly_effort: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_roi_percentage() {
        assert_relative_eq!(roi_percentage(20_000.0, 20, 10_000.0), 10.0);
        assert_eq!(roi_percentage(20_000.0, 20, 0.0), 0.0);
        assert_eq!(roi_percentage(20_000.0, 0, 10_000.0), 0.0);
        // Not clamped
        assert_relative_eq!(roi_percentage(-40_000.0, 10, 10_000.0), -40.0);
    }

    #[test]
    fn test_bank_equivalent_capital() {
        assert_relative_eq!(bank_equivalent_capital(900.0, 3.0), 30_000.0);
        assert_eq!(bank_equivalent_capital(-900.0, 3.0), 0.0);
        assert_eq!(bank_equivalent_capital(900.0, 0.0), 0.0);
    }

    #[test]
    fn test_cost_of_inaction_per_second() {
        let per_second = cost_of_inaction_per_second(10_000.0, 0.25);
        assert_relative_eq!(per_second * SECONDS_PER_YEAR, 2500.0, max_relative = 1e-12);
    }
}
