//! Yearly cash-flow records and per-financing-mode series

use serde::{Deserialize, Serialize};

/// How the installation is paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancingMode {
    /// Down payment now, monthly credit payments over the loan term
    Loan,
    /// Full price paid upfront, no credit line
    Cash,
}

impl FinancingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancingMode::Loan => "loan",
            FinancingMode::Cash => "cash",
        }
    }
}

/// First year in which cumulative savings become non-negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakEven {
    Year(u32),
    /// Cumulative savings stay negative for the whole horizon
    NotWithinHorizon,
}

impl BreakEven {
    pub fn year(&self) -> Option<u32> {
        match self {
            BreakEven::Year(y) => Some(*y),
            BreakEven::NotWithinHorizon => None,
        }
    }

    /// Break-even year for arithmetic use: `horizon + 1` when not reached
    pub fn sentinel_year(&self, horizon: u32) -> u32 {
        self.year().unwrap_or(horizon.saturating_add(1))
    }

    pub fn is_reached(&self) -> bool {
        matches!(self, BreakEven::Year(_))
    }
}

/// One projected year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyDetail {
    /// Projection year (1-indexed)
    pub year: u32,

    /// Grid price this year (€/kWh)
    pub electricity_price: f64,

    /// What the household would pay without solar
    pub bill_without_solar: f64,

    // Energy split
    pub self_consumed_kwh: f64,
    pub surplus_kwh: f64,

    /// Value of the self-consumed energy at this year's price
    pub savings_from_self_use: f64,

    /// Loan payment + insurance for the year (0 once repaid, 0 in cash mode)
    pub credit_payment: f64,

    /// Grid bill left after self-consumption
    pub residual_bill: f64,

    /// Buy-back revenue of the exported surplus
    pub surplus_revenue: f64,

    /// `credit_payment + residual_bill - surplus_revenue`
    pub total_with_solar: f64,

    /// `total_with_solar - bill_without_solar`; negative means the household is ahead
    pub net_cashflow_vs_baseline: f64,

    // Running totals
    pub cumulative_savings: f64,
    pub cumulative_spend_no_solar: f64,
    pub cumulative_spend_solar: f64,
}

impl YearlyDetail {
    /// Savings of this year alone
    pub fn yearly_gain(&self) -> f64 {
        -self.net_cashflow_vs_baseline
    }

    /// Every numeric field, labelled, for finiteness checks and charts
    pub fn values(&self) -> [(&'static str, f64); 13] {
        [
            ("electricity_price", self.electricity_price),
            ("bill_without_solar", self.bill_without_solar),
            ("self_consumed_kwh", self.self_consumed_kwh),
            ("surplus_kwh", self.surplus_kwh),
            ("savings_from_self_use", self.savings_from_self_use),
            ("credit_payment", self.credit_payment),
            ("residual_bill", self.residual_bill),
            ("surplus_revenue", self.surplus_revenue),
            ("total_with_solar", self.total_with_solar),
            ("net_cashflow_vs_baseline", self.net_cashflow_vs_baseline),
            ("cumulative_savings", self.cumulative_savings),
            ("cumulative_spend_no_solar", self.cumulative_spend_no_solar),
            ("cumulative_spend_solar", self.cumulative_spend_solar),
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.values().iter().all(|(_, v)| v.is_finite())
    }
}

/// Year-by-year projection for one financing mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSeries {
    pub mode: FinancingMode,

    /// Money spent at signature (down payment or full price); year-0 balance is its negation
    pub initial_outlay: f64,

    pub details: Vec<YearlyDetail>,
}

impl ProjectionSeries {
    pub fn new(mode: FinancingMode, initial_outlay: f64) -> Self {
        Self {
            mode,
            initial_outlay,
            details: Vec::new(),
        }
    }

    pub fn add_year(&mut self, detail: YearlyDetail) {
        self.details.push(detail);
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// First `years` years (the whole series when shorter)
    pub fn slice(&self, years: u32) -> &[YearlyDetail] {
        let end = (years as usize).min(self.details.len());
        &self.details[..end]
    }

    /// Detail of a 1-indexed year
    pub fn year(&self, year: u32) -> Option<&YearlyDetail> {
        year.checked_sub(1).and_then(|i| self.details.get(i as usize))
    }

    pub fn first(&self) -> Option<&YearlyDetail> {
        self.details.first()
    }

    pub fn last(&self) -> Option<&YearlyDetail> {
        self.details.last()
    }

    /// Cumulative savings at the end of the series (year-0 balance when empty)
    pub fn final_cumulative_savings(&self) -> f64 {
        self.last()
            .map(|d| d.cumulative_savings)
            .unwrap_or(-self.initial_outlay)
    }

    /// First year whose cumulative savings are non-negative
    pub fn break_even(&self) -> BreakEven {
        self.details
            .iter()
            .find(|d| d.cumulative_savings >= 0.0)
            .map(|d| BreakEven::Year(d.year))
            .unwrap_or(BreakEven::NotWithinHorizon)
    }

    /// Sum of every year's gain vs. no solar (excludes the initial outlay)
    pub fn total_yearly_gains(&self) -> f64 {
        self.details.iter().map(|d| d.yearly_gain()).sum()
    }

    /// Cash-flow vector for IRR: outlay at t=0 then yearly gains
    pub fn investment_flows(&self) -> Vec<f64> {
        std::iter::once(-self.initial_outlay)
            .chain(self.details.iter().map(|d| d.yearly_gain()))
            .collect()
    }
}
