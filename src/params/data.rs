//! Simulation parameter records as supplied by the quote form

use serde::{Deserialize, Serialize};

/// Longest projection the engine accepts (years)
pub const MAX_PROJECTION_YEARS: u32 = 50;

/// Horizons offered by the results dashboard
pub const STANDARD_HORIZONS: [u32; 4] = [10, 15, 20, 25];

/// A numeric form value: either a JSON number or the raw text typed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

/// Parameters exactly as received from the UI
///
/// Every field may be missing, empty, a number or a numeric string.
/// Convert with [`SimulationParams::from_raw`] before running the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSimulationParams {
    pub inflation_rate: Option<NumericInput>,
    pub electricity_price: Option<NumericInput>,
    pub yearly_production: Option<NumericInput>,
    pub self_consumption_rate: Option<NumericInput>,
    pub install_cost: Option<NumericInput>,
    pub credit_monthly_payment: Option<NumericInput>,
    pub insurance_monthly_payment: Option<NumericInput>,
    pub credit_duration_months: Option<NumericInput>,
    pub cash_down_payment: Option<NumericInput>,
    pub annual_consumption: Option<NumericInput>,
    pub credit_interest_rate: Option<NumericInput>,
    pub insurance_rate: Option<NumericInput>,
    pub projection_years: Option<NumericInput>,
}

/// Fully coerced, finite simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Yearly electricity price inflation (%/yr)
    pub inflation_rate: f64,

    /// Grid electricity price in year 1 (€/kWh)
    pub electricity_price: f64,

    /// Yearly PV production (kWh)
    pub yearly_production: f64,

    /// Share of production consumed on site (%, 0..=100)
    pub self_consumption_rate: f64,

    /// Turnkey installation price (€)
    pub install_cost: f64,

    /// Monthly loan payment; 0 derives it from the credit terms
    pub credit_monthly_payment: f64,

    /// Monthly borrower insurance; 0 derives it from the insurance rate
    pub insurance_monthly_payment: f64,

    /// Loan duration (months)
    pub credit_duration_months: u32,

    /// Cash paid upfront in the loan scenario (€)
    pub cash_down_payment: f64,

    /// Household consumption (kWh/yr)
    pub annual_consumption: f64,

    /// Nominal credit rate (%/yr)
    pub credit_interest_rate: f64,

    /// Borrower insurance rate on the initial principal (%/yr)
    pub insurance_rate: f64,

    /// Projection horizon (years)
    pub projection_years: u32,
}

impl Default for SimulationParams {
    /// Default configuration of the quote form
    fn default() -> Self {
        Self {
            inflation_rate: 5.0,
            electricity_price: 0.25,
            yearly_production: 7000.0,
            self_consumption_rate: 70.0,
            install_cost: 18799.0,
            credit_monthly_payment: 0.0,
            insurance_monthly_payment: 0.0,
            credit_duration_months: 180,
            cash_down_payment: 0.0,
            annual_consumption: 10000.0,
            credit_interest_rate: 3.89,
            insurance_rate: 0.3,
            projection_years: 20,
        }
    }
}

impl SimulationParams {
    /// Amount financed by the loan (never negative)
    pub fn loan_principal(&self) -> f64 {
        (self.install_cost - self.cash_down_payment).max(0.0)
    }

    /// Self-consumption as a fraction (0..=1)
    pub fn self_consumption_fraction(&self) -> f64 {
        self.self_consumption_rate / 100.0
    }

    /// Inflation as a fraction
    pub fn inflation_fraction(&self) -> f64 {
        self.inflation_rate / 100.0
    }

    /// Same parameters with another horizon
    pub fn with_horizon(&self, years: u32) -> Self {
        Self {
            projection_years: years.clamp(1, MAX_PROJECTION_YEARS),
            ..self.clone()
        }
    }

    /// Raw form of these parameters, every field populated
    pub fn to_raw(&self) -> RawSimulationParams {
        RawSimulationParams {
            inflation_rate: Some(self.inflation_rate.into()),
            electricity_price: Some(self.electricity_price.into()),
            yearly_production: Some(self.yearly_production.into()),
            self_consumption_rate: Some(self.self_consumption_rate.into()),
            install_cost: Some(self.install_cost.into()),
            credit_monthly_payment: Some(self.credit_monthly_payment.into()),
            insurance_monthly_payment: Some(self.insurance_monthly_payment.into()),
            credit_duration_months: Some((self.credit_duration_months as f64).into()),
            cash_down_payment: Some(self.cash_down_payment.into()),
            annual_consumption: Some(self.annual_consumption.into()),
            credit_interest_rate: Some(self.credit_interest_rate.into()),
            insurance_rate: Some(self.insurance_rate.into()),
            projection_years: Some((self.projection_years as f64).into()),
        }
    }
}
