//! Rule-based audit of projection output
//!
//! Each rule inspects a [`CalculationOutput`] on its own and reports a score
//! with errors, warnings and infos. Rules read only the public output data,
//! so the same library serves as a runtime sanity check before showing a
//! quote to a client and as a test oracle for the engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use solar_projection::{ProjectionEngine, SimulationParams, validation::validate_all};
//!
//! let output = ProjectionEngine::default().run(&SimulationParams::default());
//! let report = validate_all(&output);
//! assert!(report.is_valid, "{:?}", report.errors);
//! ```

mod rules;

pub use rules::{
    BreakEvenConsistency, EnergyBalance, GraphSeriesFinite, RoiSanity, SpendMonotonicity,
    TotalsReconciliation, CURRENCY_TOLERANCE, ENERGY_TOLERANCE_KWH,
};

use serde::{Deserialize, Serialize};

use crate::projection::CalculationOutput;

/// Result of one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule: String,
    pub is_valid: bool,
    /// 0..=100
    pub score: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
}

impl RuleOutcome {
    /// Passing outcome with a full score
    pub fn pass(rule: &str) -> Self {
        Self {
            rule: rule.to_string(),
            is_valid: true,
            score: 100.0,
            errors: Vec::new(),
            warnings: Vec::new(),
            infos: Vec::new(),
        }
    }

    /// Record an error; the outcome becomes invalid
    pub fn error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.infos.push(message.into());
    }

    /// Set the score, clamped to 0..=100
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 };
        self
    }
}

/// A single independent check over projection output
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, output: &CalculationOutput) -> RuleOutcome;
}

/// Aggregated result of all rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// AND of all rule validities
    pub is_valid: bool,
    /// Mean of rule scores, 0..=100
    pub score: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
    pub outcomes: Vec<RuleOutcome>,
}

impl ValidationReport {
    /// Combine rule outcomes
    pub fn aggregate(outcomes: Vec<RuleOutcome>) -> Self {
        let score = if outcomes.is_empty() {
            100.0
        } else {
            outcomes.iter().map(|o| o.score).sum::<f64>() / outcomes.len() as f64
        };

        Self {
            is_valid: outcomes.iter().all(|o| o.is_valid),
            score,
            errors: prefixed(&outcomes, |o| &o.errors),
            warnings: prefixed(&outcomes, |o| &o.warnings),
            infos: prefixed(&outcomes, |o| &o.infos),
            outcomes,
        }
    }

    /// Outcome of a named rule
    pub fn outcome(&self, rule: &str) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|o| o.rule == rule)
    }
}

/// Messages of every outcome, prefixed with the rule name
fn prefixed<'a>(outcomes: &'a [RuleOutcome], messages: impl Fn(&'a RuleOutcome) -> &'a Vec<String>) -> Vec<String> {
    outcomes
        .iter()
        .flat_map(|o| messages(o).iter().map(move |m| format!("[{}] {}", o.rule, m)))
        .collect()
}

/// An ordered set of rules
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    /// Every built-in rule
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(TotalsReconciliation),
            Box::new(SpendMonotonicity),
            Box::new(GraphSeriesFinite),
            Box::new(RoiSanity),
            Box::new(EnergyBalance),
            Box::new(BreakEvenConsistency),
        ])
    }

    pub fn with_rule(mut self, rule: Box<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn validate(&self, output: &CalculationOutput) -> ValidationReport {
        let outcomes: Vec<RuleOutcome> = self.rules.iter().map(|r| r.evaluate(output)).collect();
        let report = ValidationReport::aggregate(outcomes);

        if !report.is_valid {
            log::warn!("projection failed validation: {}", report.errors.join("; "));
        }
        report
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::standard()
    }
}

/// Run every built-in rule over `output`
pub fn validate_all(output: &CalculationOutput) -> ValidationReport {
    Validator::standard().validate(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParams;
    use crate::projection::ProjectionEngine;

    struct AlwaysFails;

    impl ValidationRule for AlwaysFails {
        fn name(&self) -> &'static str {
            "always_fails"
        }

        fn evaluate(&self, _output: &CalculationOutput) -> RuleOutcome {
            let mut outcome = RuleOutcome::pass(self.name()).with_score(0.0);
            outcome.error("forced failure");
            outcome
        }
    }

    #[test]
    fn test_default_quote_is_valid() {
        let output = ProjectionEngine::default().run(&SimulationParams::default());
        let report = validate_all(&output);

        assert!(report.is_valid, "errors: {:?}", report.errors);
        assert_eq!(report.score, 100.0);
        assert_eq!(report.outcomes.len(), 6);
    }

    #[test]
    fn test_aggregation_averages_and_ands() {
        let output = ProjectionEngine::default().run(&SimulationParams::default());
        let report = Validator::standard().with_rule(Box::new(AlwaysFails)).validate(&output);

        assert!(!report.is_valid);
        assert!((report.score - 600.0 / 7.0).abs() < 1e-9);
        assert_eq!(report.errors, vec!["[always_fails] forced failure".to_string()]);
    }

    #[test]
    fn test_empty_validator() {
        let report = ValidationReport::aggregate(Vec::new());
        assert!(report.is_valid);
        assert_eq!(report.score, 100.0);
    }

    #[test]
    fn test_score_clamped() {
        assert_eq!(RuleOutcome::pass("x").with_score(140.0).score, 100.0);
        assert_eq!(RuleOutcome::pass("x").with_score(f64::NAN).score, 0.0);
    }
}
