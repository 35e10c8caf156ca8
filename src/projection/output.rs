//! Complete result of a projection run

use serde::{Deserialize, Serialize};

use super::amortization::LoanTerms;
use super::cashflows::{FinancingMode, ProjectionSeries, YearlyDetail};
use super::metrics::{AggregateMetrics, ScenarioPair, YearOneSnapshot};
use crate::params::SimulationParams;

/// Split of the yearly production between the home and the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySplit {
    pub yearly_production: f64,
    pub self_consumed_kwh: f64,
    pub surplus_kwh: f64,
}

impl EnergySplit {
    /// Split `production` at `self_consumption_rate` percent
    ///
    /// Both parts stay within `[0, production]`. A non-finite production or
    /// rate yields an all-zero split.
    pub fn new(production: f64, self_consumption_rate: f64) -> Self {
        if !production.is_finite() || !self_consumption_rate.is_finite() {
            log::warn!(
                "energy split of {} kWh at {} % is not finite, using 0",
                production,
                self_consumption_rate
            );
            return Self {
                yearly_production: 0.0,
                self_consumed_kwh: 0.0,
                surplus_kwh: 0.0,
            };
        }

        let rate = self_consumption_rate.clamp(0.0, 100.0);
        let self_consumed_kwh = production * (rate / 100.0);

        Self {
            yearly_production: production,
            self_consumed_kwh,
            surplus_kwh: production - self_consumed_kwh,
        }
    }

    /// `self_consumed + surplus - production`
    pub fn imbalance(&self) -> f64 {
        self.self_consumed_kwh + self.surplus_kwh - self.yearly_production
    }
}

/// Everything the UI needs to draw a quote; JSON-serializable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutput {
    /// Coerced parameters the projection ran with
    pub params: SimulationParams,

    pub loan_terms: LoanTerms,
    pub energy: EnergySplit,

    pub loan: ProjectionSeries,
    pub cash: ProjectionSeries,

    pub scenarios: ScenarioPair,
    pub metrics: AggregateMetrics,
    pub year_one: YearOneSnapshot,
}

impl CalculationOutput {
    pub fn horizon(&self) -> u32 {
        self.params.projection_years
    }

    pub fn series(&self, mode: FinancingMode) -> &ProjectionSeries {
        match mode {
            FinancingMode::Loan => &self.loan,
            FinancingMode::Cash => &self.cash,
        }
    }

    /// Chart data: the first `years` years of a scenario
    pub fn sliced(&self, mode: FinancingMode, years: u32) -> &[YearlyDetail] {
        self.series(mode).slice(years)
    }

    /// Chart data for the full horizon of a scenario
    pub fn graph_series(&self, mode: FinancingMode) -> &[YearlyDetail] {
        self.sliced(mode, self.horizon())
    }
}
