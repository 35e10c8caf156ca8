//! Fixed-rate loan amortization and borrower insurance
//!
//! Every function here returns a finite value: degenerate inputs (no
//! principal, zero duration, overflowing growth factor) yield 0.

use serde::{Deserialize, Serialize};

use crate::params::SimulationParams;

/// `base^exp`, or `None` when the result is not finite
pub fn checked_powi(base: f64, exp: u32) -> Option<f64> {
    let value = base.powi(exp.min(i32::MAX as u32) as i32);
    value.is_finite().then_some(value)
}

/// Clamp an overflowing amount to the largest finite value of its sign
///
/// Sums and products of finite amounts can only overflow to `±inf`, never
/// NaN, so saturating keeps totals finite and ordered.
pub fn saturate(value: f64) -> f64 {
    value.clamp(-f64::MAX, f64::MAX)
}

/// Fixed monthly payment of a loan
///
/// Standard annuity formula `P * r * (1+r)^n / ((1+r)^n - 1)` with
/// `r = annual_rate_percent / 100 / 12`; straight division when the rate is 0.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, months: u32) -> f64 {
    if months == 0 || !principal.is_finite() || principal <= 0.0 || !annual_rate_percent.is_finite() {
        return 0.0;
    }

    if annual_rate_percent == 0.0 {
        return principal / months as f64;
    }

    let r = annual_rate_percent / 100.0 / 12.0;
    let growth = match checked_powi(1.0 + r, months) {
        Some(g) => g,
        None => return 0.0,
    };
    let denominator = growth - 1.0;
    if denominator == 0.0 {
        return principal / months as f64;
    }

    let payment = principal * r * growth / denominator;
    if payment.is_finite() && payment > 0.0 {
        payment
    } else {
        0.0
    }
}

/// Flat monthly borrower insurance on the initial principal
///
/// The premium does not decrease as the principal is repaid. This mirrors how
/// quotes are presented to customers today and is kept deliberately.
pub fn monthly_insurance(principal: f64, annual_insurance_rate_percent: f64) -> f64 {
    let premium = principal * (annual_insurance_rate_percent / 100.0) / 12.0;
    if premium.is_finite() && premium > 0.0 {
        premium
    } else {
        0.0
    }
}

/// Resolved credit terms of a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount financed (install cost minus down payment)
    pub principal: f64,
    pub annual_rate: f64,
    pub duration_months: u32,
    pub monthly_payment: f64,
    pub monthly_insurance: f64,
    /// Sum of all loan payments
    pub total_repaid: f64,
    /// `total_repaid - principal`, floored at 0
    pub total_interest: f64,
    pub total_insurance: f64,
}

impl LoanTerms {
    /// Resolve credit terms from parameters
    ///
    /// Payments typed in the form take precedence over the derived ones.
    pub fn from_params(params: &SimulationParams) -> Self {
        let principal = params.loan_principal();
        let months = params.credit_duration_months;

        let monthly_payment = if params.credit_monthly_payment > 0.0 {
            params.credit_monthly_payment
        } else {
            monthly_payment(principal, params.credit_interest_rate, months)
        };

        let monthly_insurance = if params.insurance_monthly_payment > 0.0 {
            params.insurance_monthly_payment
        } else {
            monthly_insurance(principal, params.insurance_rate)
        };

        let (monthly_payment, monthly_insurance) = if months == 0 || principal <= 0.0 {
            (0.0, 0.0)
        } else {
            (monthly_payment, monthly_insurance)
        };

        let total_repaid = saturate(monthly_payment * months as f64);

        Self {
            principal,
            annual_rate: params.credit_interest_rate,
            duration_months: months,
            monthly_payment,
            monthly_insurance,
            total_repaid,
            total_interest: (total_repaid - principal).max(0.0),
            total_insurance: saturate(monthly_insurance * months as f64),
        }
    }

    /// Yearly credit outflow (payment + insurance) while the loan runs
    pub fn yearly_cost(&self) -> f64 {
        saturate((self.monthly_payment + self.monthly_insurance) * 12.0)
    }

    /// Whether `year` is fully covered by the loan term
    pub fn covers_year(&self, year: u32) -> bool {
        year.saturating_mul(12) <= self.duration_months
    }

    /// Total cost of credit (interest + insurance)
    pub fn cost_of_credit(&self) -> f64 {
        saturate(self.total_interest + self.total_insurance)
    }
}
