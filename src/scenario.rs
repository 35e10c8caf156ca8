//! Scenario runner for repeated projections
//!
//! Loads assumptions once, then runs many projections (horizons, parameter
//! variants, successive form edits) without re-reading CSV files.

use crate::assumptions::Assumptions;
use crate::error::LoadError;
use crate::params::{RawSimulationParams, SimulationParams};
use crate::projection::{CalculationOutput, ProjectionEngine};
use crate::validation::{validate_all, ValidationReport};
use rayon::prelude::*;

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// for output in runner.run_horizons(&params, &STANDARD_HORIZONS) {
///     println!("{} years: {:.0} €", output.horizon(), output.metrics.total_savings_projected);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Create runner with default in-memory assumptions
    pub fn new() -> Self {
        Self::with_assumptions(Assumptions::default_pricing())
    }

    /// Create runner by loading assumptions from CSV files
    pub fn from_csv() -> Result<Self, LoadError> {
        Ok(Self::with_assumptions(Assumptions::from_csv()?))
    }

    /// Create runner from specific assumptions directory
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self, LoadError> {
        Ok(Self::with_assumptions(Assumptions::from_csv_path(path)?))
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            engine: ProjectionEngine::new(assumptions),
        }
    }

    pub fn run(&self, params: &SimulationParams) -> CalculationOutput {
        self.engine.run(params)
    }

    /// Run and audit a single projection
    pub fn run_validated(&self, params: &SimulationParams) -> (CalculationOutput, ValidationReport) {
        let output = self.engine.run(params);
        let report = validate_all(&output);
        (output, report)
    }

    /// Same parameters over several horizons
    pub fn run_horizons(&self, params: &SimulationParams, horizons: &[u32]) -> Vec<CalculationOutput> {
        horizons
            .iter()
            .map(|&years| self.engine.run(&params.with_horizon(years)))
            .collect()
    }

    /// Several parameter sets with the same assumptions, in parallel
    pub fn run_batch(&self, params: &[SimulationParams]) -> Vec<CalculationOutput> {
        params.par_iter().map(|p| self.engine.run(p)).collect()
    }

    /// Property value increase of a solar-equipped home in `department`
    pub fn property_value_uplift(&self, department: &str, surface_m2: f64) -> f64 {
        let assumptions = self.engine.assumptions();
        assumptions.regional_pricing.property_value_uplift(
            department,
            surface_m2,
            assumptions.market.green_value_uplift,
        )
    }

    pub fn assumptions(&self) -> &Assumptions {
        self.engine.assumptions()
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Live quote being edited in the form
///
/// Each edit is coerced against the last parameters that produced a valid
/// projection, so a bad keystroke never reaches the screen as NaN.
#[derive(Debug, Clone)]
pub struct QuoteSession {
    runner: ScenarioRunner,
    last_good: SimulationParams,
}

/// Outcome of one form edit
#[derive(Debug, Clone)]
pub struct QuoteUpdate {
    pub output: CalculationOutput,
    pub report: ValidationReport,
    /// Whether any field was replaced by its last good value, or the whole
    /// edit was rejected
    pub fell_back: bool,
    /// Fields whose typed value was unusable
    pub rejected_fields: Vec<&'static str>,
}

impl QuoteSession {
    pub fn new(runner: ScenarioRunner) -> Self {
        Self {
            runner,
            last_good: SimulationParams::default(),
        }
    }

    pub fn last_good(&self) -> &SimulationParams {
        &self.last_good
    }

    /// Apply a form edit
    pub fn update(&mut self, raw: &RawSimulationParams) -> QuoteUpdate {
        let (params, rejected_fields) = SimulationParams::coerce_reporting(raw, &self.last_good);
        let (output, report) = self.runner.run_validated(&params);

        if report.is_valid {
            self.last_good = params;
            return QuoteUpdate {
                output,
                report,
                fell_back: !rejected_fields.is_empty(),
                rejected_fields,
            };
        }

        log::warn!("edit rejected, showing last good quote: {}", report.errors.join("; "));
        let (output, report) = self.runner.run_validated(&self.last_good);
        QuoteUpdate {
            output,
            report,
            fell_back: true,
            rejected_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::STANDARD_HORIZONS;

    #[test]
    fn test_run_horizons() {
        let runner = ScenarioRunner::new();
        let outputs = runner.run_horizons(&SimulationParams::default(), &STANDARD_HORIZONS);

        assert_eq!(outputs.len(), 4);
        assert_eq!(outputs[0].loan.len(), 10);
        assert_eq!(outputs[3].loan.len(), 25);

        // Longer horizons include the post-loan years, so savings grow
        assert!(outputs[3].metrics.total_savings_projected > outputs[2].metrics.total_savings_projected);
    }

    #[test]
    fn test_horizon_slice_matches_shorter_run() {
        let runner = ScenarioRunner::new();
        let long = runner.run(&SimulationParams::default().with_horizon(25));
        let short = runner.run(&SimulationParams::default().with_horizon(10));

        assert_eq!(long.loan.slice(10), short.loan.details.as_slice());
    }

    #[test]
    fn test_property_value_uplift() {
        let runner = ScenarioRunner::new();
        assert!((runner.property_value_uplift("75", 100.0) - 30_300.0).abs() < 1e-6);
    }

    #[test]
    fn test_session_keeps_last_good_values() {
        let mut session = QuoteSession::new(ScenarioRunner::new());

        let first = session.update(&RawSimulationParams {
            install_cost: Some("15000".into()),
            ..Default::default()
        });
        assert!(!first.fell_back);
        assert_eq!(session.last_good().install_cost, 15_000.0);

        // Garbage keeps the previous install cost instead of the factory default
        let second = session.update(&RawSimulationParams {
            install_cost: Some("15 0x0".into()),
            ..Default::default()
        });
        assert_eq!(second.output.params.install_cost, 15_000.0);
        assert!(second.report.is_valid);
        assert!(second.fell_back);
        assert_eq!(second.rejected_fields, vec!["install_cost"]);
    }

    #[test]
    fn test_session_flags_text_edit_on_default_field() {
        let mut session = QuoteSession::new(ScenarioRunner::new());

        let update = session.update(&RawSimulationParams {
            install_cost: Some("douze mille".into()),
            ..Default::default()
        });
        assert!(update.fell_back);
        assert_eq!(update.output.params.install_cost, 18_799.0);

        let clean = session.update(&RawSimulationParams {
            install_cost: Some("12 000 €".into()),
            ..Default::default()
        });
        assert!(!clean.fell_back);
        assert!(clean.rejected_fields.is_empty());
    }

    #[test]
    fn test_run_batch_keeps_input_order() {
        let runner = ScenarioRunner::new();
        let params: Vec<SimulationParams> = STANDARD_HORIZONS
            .iter()
            .map(|&years| SimulationParams::default().with_horizon(years))
            .collect();

        let outputs = runner.run_batch(&params);
        let horizons: Vec<u32> = outputs.iter().map(|o| o.horizon()).collect();
        assert_eq!(horizons, STANDARD_HORIZONS.to_vec());
    }
}
