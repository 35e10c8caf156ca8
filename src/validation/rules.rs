//! Built-in validation rules

use super::{RuleOutcome, ValidationRule};
use crate::projection::{BreakEven, CalculationOutput, FinancingMode, YearlyDetail};

/// Money amounts are compared to within one currency unit
pub const CURRENCY_TOLERANCE: f64 = 1.0;

/// Energy amounts are compared to within one kWh
pub const ENERGY_TOLERANCE_KWH: f64 = 1.0;

/// Relative floor on the energy tolerance for very large productions
const ENERGY_RELATIVE_TOLERANCE: f64 = 1e-12;

const MODES: [FinancingMode; 2] = [FinancingMode::Loan, FinancingMode::Cash];

/// Final cumulative savings must match the reported totals
pub struct TotalsReconciliation;

impl ValidationRule for TotalsReconciliation {
    fn name(&self) -> &'static str {
        "totals_reconciliation"
    }

    fn evaluate(&self, output: &CalculationOutput) -> RuleOutcome {
        let mut outcome = RuleOutcome::pass(self.name());
        let mut checks = 0;
        let mut failures = 0;

        let metrics = &output.metrics;
        let scenarios = &output.scenarios;
        let reported = [
            (FinancingMode::Loan, "metrics.total_savings_projected", metrics.total_savings_projected),
            (
                FinancingMode::Cash,
                "metrics.total_savings_projected_cash",
                metrics.total_savings_projected_cash,
            ),
            (FinancingMode::Loan, "scenarios.loan.total_savings", scenarios.loan.total_savings),
            (FinancingMode::Cash, "scenarios.cash.total_savings", scenarios.cash.total_savings),
        ];

        for (mode, label, total) in reported {
            checks += 1;
            let Some(last) = output.series(mode).last() else {
                failures += 1;
                outcome.error(format!(
                    "totals mismatch: {} series is empty, {} = {:.2}",
                    mode.as_str(),
                    label,
                    total
                ));
                continue;
            };

            let gap = (last.cumulative_savings - total).abs();
            if !(gap <= CURRENCY_TOLERANCE) {
                failures += 1;
                outcome.error(format!(
                    "totals mismatch: {} = {:.2} but final {} cumulative savings = {:.2} (gap {:.2})",
                    label,
                    total,
                    mode.as_str(),
                    last.cumulative_savings,
                    gap
                ));
            }
        }

        outcome.info(format!(
            "total savings {:.2} (loan), {:.2} (cash)",
            output.metrics.total_savings_projected, output.metrics.total_savings_projected_cash
        ));
        outcome.with_score(100.0 * (checks - failures) as f64 / checks as f64)
    }
}

/// Spend without solar must grow every year when prices inflate
///
/// Cumulative savings are allowed to dip (e.g. while the loan runs); dips are
/// reported as infos only.
pub struct SpendMonotonicity;

impl ValidationRule for SpendMonotonicity {
    fn name(&self) -> &'static str {
        "spend_monotonicity"
    }

    fn evaluate(&self, output: &CalculationOutput) -> RuleOutcome {
        let mut outcome = RuleOutcome::pass(self.name());
        let inflation = output.params.inflation_rate;
        let details = &output.loan.details;

        if details.is_empty() {
            outcome.warning("no yearly details to check");
            return outcome;
        }

        let steps = details.len().saturating_sub(1).max(1);
        let mut violations = 0;

        if details[0].bill_without_solar <= 0.0 {
            outcome.info("no electricity bill without solar, spend stays flat");
        } else if inflation > 0.0 {
            for pair in details.windows(2) {
                if !(pair[1].cumulative_spend_no_solar > pair[0].cumulative_spend_no_solar) {
                    violations += 1;
                    outcome.error(format!(
                        "cumulative spend without solar not increasing in year {}: {:.2} -> {:.2}",
                        pair[1].year,
                        pair[0].cumulative_spend_no_solar,
                        pair[1].cumulative_spend_no_solar
                    ));
                }
            }
        } else if inflation == 0.0 {
            let first_bill = details[0].bill_without_solar;
            for d in &details[1..] {
                if !((d.bill_without_solar - first_bill).abs() <= CURRENCY_TOLERANCE) {
                    violations += 1;
                    outcome.error(format!(
                        "bill without solar should be constant at zero inflation: year {} = {:.2}, year 1 = {:.2}",
                        d.year,
                        d.bill_without_solar,
                        first_bill
                    ));
                }
            }
        } else {
            outcome.info(format!("negative inflation ({:.2} %), growth not checked", inflation));
        }

        let dips = savings_dips(details);
        if !dips.is_empty() {
            outcome.info(format!("cumulative savings dip in years {:?}", dips));
        }

        outcome.with_score(100.0 * (1.0 - violations as f64 / steps as f64))
    }
}

fn savings_dips(details: &[YearlyDetail]) -> Vec<u32> {
    details
        .windows(2)
        .filter(|pair| pair[1].cumulative_savings < pair[0].cumulative_savings)
        .map(|pair| pair[1].year)
        .collect()
}

/// Chart series must be non-empty with finite values only
pub struct GraphSeriesFinite;

impl ValidationRule for GraphSeriesFinite {
    fn name(&self) -> &'static str {
        "graph_series_finite"
    }

    fn evaluate(&self, output: &CalculationOutput) -> RuleOutcome {
        let mut outcome = RuleOutcome::pass(self.name());
        let mut total = 0usize;
        let mut bad = 0usize;

        for mode in MODES {
            let series = output.graph_series(mode);
            if series.is_empty() {
                outcome.error(format!("{} graph series is empty", mode.as_str()));
                return outcome.with_score(0.0);
            }
            if series.len() < output.horizon() as usize {
                outcome.warning(format!(
                    "{} graph series covers {} of {} years",
                    mode.as_str(),
                    series.len(),
                    output.horizon()
                ));
            }

            for detail in series {
                for (field, value) in detail.values() {
                    total += 1;
                    if !value.is_finite() {
                        bad += 1;
                        outcome.error(format!(
                            "{} year {}: {} is not finite ({})",
                            mode.as_str(),
                            detail.year,
                            field,
                            value
                        ));
                    }
                }
            }
        }

        outcome.with_score(100.0 * (total - bad) as f64 / total as f64)
    }
}

/// ROI must be finite and agree in sign with total savings
pub struct RoiSanity;

impl ValidationRule for RoiSanity {
    fn name(&self) -> &'static str {
        "roi_sanity"
    }

    fn evaluate(&self, output: &CalculationOutput) -> RuleOutcome {
        let mut outcome = RuleOutcome::pass(self.name());
        let roi = output.metrics.roi_percentage;
        let total = output.metrics.total_savings_projected;

        if !roi.is_finite() {
            outcome.error(format!("ROI is not finite ({})", roi));
            return outcome.with_score(0.0);
        }

        if roi > 0.0 && total <= 0.0 {
            outcome.error(format!(
                "positive ROI ({:.2} %) with non-positive total savings ({:.2})",
                roi, total
            ));
            return outcome.with_score(0.0);
        }

        if roi < 0.0 {
            outcome.warning(format!("negative ROI ({:.2} %)", roi));
        } else if roi > 100.0 {
            outcome.warning(format!("unusually high ROI ({:.2} %)", roi));
        }

        outcome.info(format!("ROI {:.2} %", roi));
        outcome
    }
}

/// Self-consumed + surplus energy must equal production
pub struct EnergyBalance;

impl ValidationRule for EnergyBalance {
    fn name(&self) -> &'static str {
        "energy_balance"
    }

    fn evaluate(&self, output: &CalculationOutput) -> RuleOutcome {
        let mut outcome = RuleOutcome::pass(self.name());
        let energy = &output.energy;
        let rate = output.params.self_consumption_rate;

        if !(0.0..=100.0).contains(&rate) {
            outcome.error(format!("self-consumption rate {:.2} % outside [0, 100]", rate));
        }

        let tolerance = ENERGY_TOLERANCE_KWH.max(energy.yearly_production.abs() * ENERGY_RELATIVE_TOLERANCE);

        if !(energy.imbalance().abs() < tolerance) {
            outcome.error(format!(
                "energy split does not add up: {:.2} + {:.2} != {:.2} kWh",
                energy.self_consumed_kwh, energy.surplus_kwh, energy.yearly_production
            ));
        }

        for mode in MODES {
            let unbalanced = output
                .series(mode)
                .details
                .iter()
                .filter(|d| {
                    let gap = d.self_consumed_kwh + d.surplus_kwh - energy.yearly_production;
                    !(gap.abs() < tolerance)
                })
                .count();
            if unbalanced > 0 {
                outcome.error(format!(
                    "{} series: {} years with unbalanced energy",
                    mode.as_str(),
                    unbalanced
                ));
            }
        }

        if energy.surplus_kwh == 0.0 && output.loan.details.iter().any(|d| d.surplus_revenue != 0.0) {
            outcome.error("surplus revenue reported without surplus energy");
        }

        let score = if outcome.is_valid { 100.0 } else { 0.0 };
        outcome.with_score(score)
    }
}

/// Reported break-even must be the first year with non-negative savings
pub struct BreakEvenConsistency;

impl BreakEvenConsistency {
    fn check(
        outcome: &mut RuleOutcome,
        mode: FinancingMode,
        reported: BreakEven,
        details: &[YearlyDetail],
        horizon: u32,
    ) -> bool {
        let first_positive = details
            .iter()
            .find(|d| d.cumulative_savings >= 0.0)
            .map(|d| d.year);

        match (reported, first_positive) {
            (BreakEven::Year(y), Some(expected)) if y == expected => {
                outcome.info(format!("{} break-even in year {}", mode.as_str(), y));
                true
            }
            (BreakEven::NotWithinHorizon, None) => {
                outcome.warning(format!(
                    "{} break-even not reached within {} years",
                    mode.as_str(),
                    horizon
                ));
                true
            }
            (reported, expected) => {
                outcome.error(format!(
                    "{} break-even reported as {:?} but cumulative savings first turn non-negative in {:?}",
                    mode.as_str(),
                    reported,
                    expected
                ));
                false
            }
        }
    }
}

impl ValidationRule for BreakEvenConsistency {
    fn name(&self) -> &'static str {
        "break_even_consistency"
    }

    fn evaluate(&self, output: &CalculationOutput) -> RuleOutcome {
        let mut outcome = RuleOutcome::pass(self.name());
        let horizon = output.horizon();

        let loan_ok = Self::check(
            &mut outcome,
            FinancingMode::Loan,
            output.metrics.break_even,
            &output.loan.details,
            horizon,
        );
        let cash_ok = Self::check(
            &mut outcome,
            FinancingMode::Cash,
            output.metrics.break_even_cash,
            &output.cash.details,
            horizon,
        );

        let passed = [loan_ok, cash_ok].iter().filter(|ok| **ok).count();
        outcome.with_score(50.0 * passed as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParams;
    use crate::projection::ProjectionEngine;

    fn output(params: SimulationParams) -> CalculationOutput {
        ProjectionEngine::default().run(&params)
    }

    #[test]
    fn test_totals_mismatch_detected() {
        let mut out = output(SimulationParams::default());
        out.metrics.total_savings_projected += 5.0;

        let outcome = TotalsReconciliation.evaluate(&out);
        assert!(!outcome.is_valid);
        assert!(outcome.errors[0].contains("totals mismatch"));
        assert_eq!(outcome.score, 75.0);
    }

    #[test]
    fn test_totals_within_tolerance_pass() {
        let mut out = output(SimulationParams::default());
        out.metrics.total_savings_projected += 0.5;
        assert!(TotalsReconciliation.evaluate(&out).is_valid);
    }

    #[test]
    fn test_spend_must_increase_with_inflation() {
        let mut out = output(SimulationParams::default());
        out.loan.details[5].cumulative_spend_no_solar = out.loan.details[4].cumulative_spend_no_solar;

        let outcome = SpendMonotonicity.evaluate(&out);
        assert!(!outcome.is_valid);
        assert!(outcome.errors[0].contains("year 6"));
    }

    #[test]
    fn test_flat_bill_at_zero_inflation() {
        let out = output(SimulationParams {
            inflation_rate: 0.0,
            ..Default::default()
        });
        let outcome = SpendMonotonicity.evaluate(&out);
        assert!(outcome.is_valid, "{:?}", outcome.errors);

        let mut tampered = out.clone();
        tampered.loan.details[3].bill_without_solar += 10.0;
        assert!(!SpendMonotonicity.evaluate(&tampered).is_valid);
    }

    #[test]
    fn test_savings_dip_is_info_only() {
        let out = output(SimulationParams::default());
        let outcome = SpendMonotonicity.evaluate(&out);
        assert!(outcome.is_valid);
        assert!(outcome.infos.iter().any(|m| m.contains("dip")));
    }

    #[test]
    fn test_non_finite_graph_value() {
        let mut out = output(SimulationParams::default());
        out.cash.details[2].residual_bill = f64::NAN;

        let outcome = GraphSeriesFinite.evaluate(&out);
        assert!(!outcome.is_valid);
        assert!(outcome.errors[0].contains("residual_bill"));
        assert!(outcome.score < 100.0 && outcome.score > 0.0);
    }

    #[test]
    fn test_empty_graph_series() {
        let mut out = output(SimulationParams::default());
        out.loan.details.clear();

        let outcome = GraphSeriesFinite.evaluate(&out);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn test_roi_sign_inconsistency() {
        let mut out = output(SimulationParams::default());
        out.metrics.total_savings_projected = -10.0;

        let outcome = RoiSanity.evaluate(&out);
        assert!(!outcome.is_valid);

        out.metrics.roi_percentage = f64::INFINITY;
        assert!(!RoiSanity.evaluate(&out).is_valid);
    }

    #[test]
    fn test_negative_roi_is_warning() {
        let out = output(SimulationParams {
            yearly_production: 500.0,
            ..Default::default()
        });
        let outcome = RoiSanity.evaluate(&out);
        assert!(outcome.is_valid);
        assert!(!outcome.warnings.is_empty());
    }

    #[test]
    fn test_energy_balance() {
        let out = output(SimulationParams {
            self_consumption_rate: 100.0,
            ..Default::default()
        });
        assert!(EnergyBalance.evaluate(&out).is_valid);

        let mut tampered = out.clone();
        tampered.energy.surplus_kwh = 50.0;
        assert!(!EnergyBalance.evaluate(&tampered).is_valid);
    }

    #[test]
    fn test_break_even_consistency() {
        let out = output(SimulationParams::default());
        assert!(BreakEvenConsistency.evaluate(&out).is_valid);

        let mut tampered = out.clone();
        tampered.metrics.break_even = BreakEven::Year(1);
        let outcome = BreakEvenConsistency.evaluate(&tampered);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.score, 50.0);
    }

    #[test]
    fn test_break_even_not_reached_is_warning() {
        let out = output(SimulationParams {
            yearly_production: 500.0,
            projection_years: 10,
            ..Default::default()
        });
        assert_eq!(out.metrics.break_even, BreakEven::NotWithinHorizon);

        let outcome = BreakEvenConsistency.evaluate(&out);
        assert!(outcome.is_valid);
        assert!(!outcome.warnings.is_empty());
    }
}
