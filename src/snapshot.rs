//! Persisted study snapshots for the read-only client view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::projection::{CalculationOutput, ProjectionEngine};
use crate::validation::CURRENCY_TOLERANCE;

/// A projection frozen at the time it was shown to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySnapshot {
    pub created_at: DateTime<Utc>,

    /// Free-form label (customer name, study reference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub output: CalculationOutput,
}

impl StudySnapshot {
    pub fn new(output: CalculationOutput) -> Self {
        Self::at(output, Utc::now())
    }

    pub fn at(output: CalculationOutput, created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            label: None,
            output,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether re-running `engine` on the stored parameters gives the stored totals
    ///
    /// A mismatch means the snapshot predates a change in assumptions or
    /// engine behavior.
    pub fn matches_engine(&self, engine: &ProjectionEngine) -> bool {
        let fresh = engine.run(&self.output.params);
        let stored = &self.output.metrics;

        (fresh.metrics.total_savings_projected - stored.total_savings_projected).abs() <= CURRENCY_TOLERANCE
            && (fresh.metrics.total_savings_projected_cash - stored.total_savings_projected_cash).abs()
                <= CURRENCY_TOLERANCE
            && fresh.metrics.break_even == stored.break_even
    }
}
