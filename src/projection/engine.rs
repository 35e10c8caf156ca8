//! Core projection engine for yearly solar cash-flow projections

use crate::assumptions::Assumptions;
use crate::params::{RawSimulationParams, SimulationParams};
use super::amortization::{saturate, LoanTerms};
use super::cashflows::{FinancingMode, ProjectionSeries, YearlyDetail};
use super::metrics::{AggregateMetrics, ScenarioPair, ScenarioSummary, YearOneSnapshot};
use super::output::{CalculationOutput, EnergySplit};
use super::state::ProjectionState;

/// Main projection engine
///
/// Stateless apart from its assumptions: [`ProjectionEngine::run`] is a pure
/// function of the parameters and can be called on every form change.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(Assumptions::default_pricing())
    }
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Coerce raw form values then project
    pub fn run_raw(&self, raw: &RawSimulationParams) -> CalculationOutput {
        self.run(&SimulationParams::from_raw(raw))
    }

    /// Run the full projection for one parameter set
    pub fn run(&self, params: &SimulationParams) -> CalculationOutput {
        let terms = LoanTerms::from_params(params);
        let energy = EnergySplit::new(params.yearly_production, params.self_consumption_rate);

        let down_payment = params.cash_down_payment.min(params.install_cost);
        let loan = self.project_series(params, &terms, &energy, FinancingMode::Loan, down_payment);
        let cash = self.project_series(params, &terms, &energy, FinancingMode::Cash, params.install_cost);

        let metrics = AggregateMetrics::derive(params, &self.assumptions.market, &loan, &cash);
        let scenarios = ScenarioPair {
            loan: ScenarioSummary::from_series(&loan, params),
            cash: ScenarioSummary::from_series(&cash, params),
        };
        let year_one = YearOneSnapshot::from_series(&loan, &terms);

        log::debug!(
            "projected {} years: total savings {:.2} (loan) / {:.2} (cash), break-even {:?}",
            params.projection_years,
            metrics.total_savings_projected,
            metrics.total_savings_projected_cash,
            metrics.break_even
        );

        CalculationOutput {
            params: params.clone(),
            loan_terms: terms,
            energy,
            loan,
            cash,
            scenarios,
            metrics,
            year_one,
        }
    }

    /// Project one financing mode over the horizon
    pub fn project_series(
        &self,
        params: &SimulationParams,
        terms: &LoanTerms,
        energy: &EnergySplit,
        mode: FinancingMode,
        initial_outlay: f64,
    ) -> ProjectionSeries {
        let mut series = ProjectionSeries::new(mode, initial_outlay);
        let mut state = ProjectionState::seed(mode, initial_outlay);
        let inflation = params.inflation_fraction();

        for _year in 1..=params.projection_years {
            state.advance_year(inflation);
            let detail = self.calculate_year(params, terms, energy, &mut state);
            series.add_year(detail);
        }

        series
    }

    /// Cash flows of the current year of `state`
    fn calculate_year(
        &self,
        params: &SimulationParams,
        terms: &LoanTerms,
        energy: &EnergySplit,
        state: &mut ProjectionState,
    ) -> YearlyDetail {
        let year = state.year;
        let factor = state.inflation_factor;
        let guard = |name: &str, value: f64| finite_or_zero(year, name, value);

        let electricity_price = guard("electricity_price", params.electricity_price * factor);
        let bill_without_solar = guard(
            "bill_without_solar",
            params.annual_consumption * electricity_price,
        );

        let savings_from_self_use = guard(
            "savings_from_self_use",
            energy.self_consumed_kwh * electricity_price,
        );
        let residual_bill = saturate((bill_without_solar - savings_from_self_use).max(0.0));
        let surplus_revenue = guard(
            "surplus_revenue",
            energy.surplus_kwh * (self.assumptions.market.buyback_rate * factor),
        );

        let credit_payment = if state.mode == FinancingMode::Loan && terms.covers_year(year) {
            guard("credit_payment", terms.yearly_cost())
        } else {
            0.0
        };

        // Each operand is finite, so these can only saturate
        let total_with_solar = saturate(saturate(credit_payment + residual_bill) - surplus_revenue);
        let net_cashflow_vs_baseline = saturate(total_with_solar - bill_without_solar);

        state.record(bill_without_solar, total_with_solar, net_cashflow_vs_baseline);

        YearlyDetail {
            year,
            electricity_price,
            bill_without_solar,
            self_consumed_kwh: energy.self_consumed_kwh,
            surplus_kwh: energy.surplus_kwh,
            savings_from_self_use,
            credit_payment,
            residual_bill,
            surplus_revenue,
            total_with_solar,
            net_cashflow_vs_baseline,
            cumulative_savings: state.cumulative_savings,
            cumulative_spend_no_solar: state.cumulative_spend_no_solar,
            cumulative_spend_solar: state.cumulative_spend_solar,
        }
    }
}

fn finite_or_zero(year: u32, name: &str, value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        log::warn!("year {}: {} is not finite ({}), using 0", year, name, value);
        0.0
    }
}

/// Coerce and project with the given assumptions
pub fn calculate(raw: &RawSimulationParams, assumptions: &Assumptions) -> CalculationOutput {
    ProjectionEngine::new(assumptions.clone()).run_raw(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn run(params: SimulationParams) -> CalculationOutput {
        ProjectionEngine::default().run(&params)
    }

    #[test]
    fn test_projection_runs() {
        let output = run(SimulationParams::default());

        assert_eq!(output.loan.len(), 20);
        assert_eq!(output.cash.len(), 20);
        assert_eq!(output.loan.details[0].year, 1);
        assert_eq!(output.loan.details[19].year, 20);
    }

    #[test]
    fn test_year_one_default_quote() {
        let output = run(SimulationParams::default());
        let y1 = &output.loan.details[0];

        assert_relative_eq!(y1.electricity_price, 0.25);
        assert_relative_eq!(y1.bill_without_solar, 2500.0);
        assert_relative_eq!(y1.self_consumed_kwh, 4900.0);
        assert_abs_diff_eq!(y1.surplus_kwh, 2100.0, epsilon = 1e-9);
        assert_relative_eq!(y1.savings_from_self_use, 1225.0);
        assert_relative_eq!(y1.residual_bill, 1275.0);
        assert_abs_diff_eq!(y1.surplus_revenue, 84.0, epsilon = 1e-9);

        let yearly_credit = (output.loan_terms.monthly_payment + output.loan_terms.monthly_insurance) * 12.0;
        assert_relative_eq!(y1.credit_payment, yearly_credit);
        assert_relative_eq!(y1.total_with_solar, yearly_credit + 1275.0 - 84.0, max_relative = 1e-12);
        assert_relative_eq!(y1.cumulative_savings, -y1.net_cashflow_vs_baseline);
    }

    #[test]
    fn test_credit_stops_after_term() {
        let output = run(SimulationParams {
            credit_duration_months: 120,
            projection_years: 15,
            ..Default::default()
        });

        assert!(output.loan.details[9].credit_payment > 0.0);
        assert_eq!(output.loan.details[10].credit_payment, 0.0);
        assert!(output.cash.details.iter().all(|d| d.credit_payment == 0.0));
    }

    #[test]
    fn test_partial_final_year_is_not_charged() {
        // 30 months covers years 1 and 2 only
        let output = run(SimulationParams {
            credit_duration_months: 30,
            ..Default::default()
        });
        assert!(output.loan.details[1].credit_payment > 0.0);
        assert_eq!(output.loan.details[2].credit_payment, 0.0);
    }

    #[test]
    fn test_seeding_by_mode() {
        let params = SimulationParams {
            cash_down_payment: 3000.0,
            ..Default::default()
        };
        let output = run(params);

        assert_eq!(output.loan.initial_outlay, 3000.0);
        assert_eq!(output.cash.initial_outlay, 18_799.0);

        let cash_y1 = &output.cash.details[0];
        assert_relative_eq!(
            cash_y1.cumulative_savings,
            -18_799.0 - cash_y1.net_cashflow_vs_baseline,
            max_relative = 1e-12
        );
        assert_relative_eq!(cash_y1.cumulative_spend_solar, 18_799.0 + cash_y1.total_with_solar);
    }

    #[test]
    fn test_down_payment_above_price_is_capped() {
        let output = run(SimulationParams {
            cash_down_payment: 50_000.0,
            ..Default::default()
        });
        assert_eq!(output.loan.initial_outlay, 18_799.0);
        assert_eq!(output.loan_terms.principal, 0.0);
    }

    #[test]
    fn test_residual_bill_floors_at_zero() {
        let output = run(SimulationParams {
            annual_consumption: 1000.0,
            self_consumption_rate: 100.0,
            ..Default::default()
        });
        assert!(output.loan.details.iter().all(|d| d.residual_bill == 0.0));
    }

    #[test]
    fn test_zero_production() {
        let output = run(SimulationParams {
            yearly_production: 0.0,
            ..Default::default()
        });
        for d in &output.loan.details {
            assert_eq!(d.surplus_revenue, 0.0);
            assert_relative_eq!(d.residual_bill, d.bill_without_solar);
        }
        assert!(output.metrics.total_savings_projected < 0.0);
    }

    #[test]
    fn test_inflation_compounds_prices() {
        let output = run(SimulationParams::default());
        let y10 = &output.loan.details[9];
        assert_relative_eq!(y10.electricity_price, 0.25 * 1.05_f64.powi(9), max_relative = 1e-12);
        assert_relative_eq!(y10.surplus_revenue, 2100.0 * 0.04 * 1.05_f64.powi(9), max_relative = 1e-9);
    }

    #[test]
    fn test_calculate_from_raw() {
        let raw = RawSimulationParams {
            electricity_price: Some("0,30".into()),
            projection_years: Some("not a number".into()),
            ..Default::default()
        };
        let output = calculate(&raw, &Assumptions::default_pricing());
        assert_eq!(output.params.electricity_price, 0.30);
        assert_eq!(output.loan.len(), 20);
    }

    #[test]
    fn test_output_is_json_serializable() {
        let output = run(SimulationParams::default());
        let json = serde_json::to_string(&output).unwrap();
        let back: CalculationOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.loan.len(), output.loan.len());
        assert_eq!(back.metrics.break_even, output.metrics.break_even);
    }
}
