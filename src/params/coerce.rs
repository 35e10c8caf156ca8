//! Coercion of raw form values into finite simulation parameters
//!
//! Missing, empty or non-numeric values never fail: they fall back to the
//! matching field of a fallback parameter set (the documented defaults or the
//! last parameters that produced a good result).

use super::data::{NumericInput, RawSimulationParams, SimulationParams, MAX_PROJECTION_YEARS};

/// Parse a form value into a finite number
///
/// Text accepts a decimal comma, blanks used as thousands separators, and a
/// trailing `€` or `%`.
pub fn parse_numeric(input: &NumericInput) -> Option<f64> {
    let value = match input {
        NumericInput::Number(n) => *n,
        NumericInput::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '€' && *c != '%')
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
    };

    value.is_finite().then_some(value)
}

/// Field-by-field coercion against a fallback parameter set
///
/// Remembers the fields whose value was unusable and replaced by the
/// fallback. Clamped values are not counted.
struct Coercer<'a> {
    fallback: &'a SimulationParams,
    rejected: Vec<&'static str>,
}

impl<'a> Coercer<'a> {
    fn new(fallback: &'a SimulationParams) -> Self {
        Self {
            fallback,
            rejected: Vec::new(),
        }
    }

    /// Coerce one field, substituting `fallback` when the value is unusable
    fn field(&mut self, name: &'static str, input: Option<&NumericInput>, fallback: f64) -> f64 {
        match input {
            None => fallback,
            Some(raw) => match parse_numeric(raw) {
                Some(value) => value,
                None => {
                    log::warn!("parameter {} has unusable value {:?}, using {}", name, raw, fallback);
                    self.rejected.push(name);
                    fallback
                }
            },
        }
    }

    /// Coerce a field that must not be negative
    fn non_negative(&mut self, name: &'static str, input: Option<&NumericInput>, fallback: f64) -> f64 {
        let value = self.field(name, input, fallback);
        if value < 0.0 {
            log::warn!("parameter {} is negative ({}), flooring at 0", name, value);
            0.0
        } else {
            value
        }
    }

    /// Coerce a whole-number field (months, years)
    fn whole(&mut self, name: &'static str, input: Option<&NumericInput>, fallback: u32, max: u32) -> u32 {
        let value = self.field(name, input, fallback as f64).round();
        if value < 0.0 {
            log::warn!("parameter {} is negative ({}), flooring at 0", name, value);
            0
        } else {
            value.min(max as f64) as u32
        }
    }

    fn coerce(&mut self, raw: &RawSimulationParams) -> SimulationParams {
        let fallback = self.fallback;

        // Inflation at or below -100 % would make the growth factor non-positive
        let inflation_rate = self
            .field("inflation_rate", raw.inflation_rate.as_ref(), fallback.inflation_rate)
            .max(-99.0);

        let self_consumption_rate = self.field(
            "self_consumption_rate",
            raw.self_consumption_rate.as_ref(),
            fallback.self_consumption_rate,
        );
        let clamped_rate = self_consumption_rate.clamp(0.0, 100.0);
        if clamped_rate != self_consumption_rate {
            log::warn!(
                "self_consumption_rate {} outside [0, 100], clamped to {}",
                self_consumption_rate,
                clamped_rate
            );
        }

        let projection_years = self
            .whole(
                "projection_years",
                raw.projection_years.as_ref(),
                fallback.projection_years,
                MAX_PROJECTION_YEARS,
            )
            .max(1);

        SimulationParams {
            inflation_rate,
            electricity_price: self.non_negative(
                "electricity_price",
                raw.electricity_price.as_ref(),
                fallback.electricity_price,
            ),
            yearly_production: self.non_negative(
                "yearly_production",
                raw.yearly_production.as_ref(),
                fallback.yearly_production,
            ),
            self_consumption_rate: clamped_rate,
            install_cost: self.non_negative("install_cost", raw.install_cost.as_ref(), fallback.install_cost),
            credit_monthly_payment: self.non_negative(
                "credit_monthly_payment",
                raw.credit_monthly_payment.as_ref(),
                fallback.credit_monthly_payment,
            ),
            insurance_monthly_payment: self.non_negative(
                "insurance_monthly_payment",
                raw.insurance_monthly_payment.as_ref(),
                fallback.insurance_monthly_payment,
            ),
            credit_duration_months: self.whole(
                "credit_duration_months",
                raw.credit_duration_months.as_ref(),
                fallback.credit_duration_months,
                MAX_PROJECTION_YEARS * 12,
            ),
            cash_down_payment: self.non_negative(
                "cash_down_payment",
                raw.cash_down_payment.as_ref(),
                fallback.cash_down_payment,
            ),
            annual_consumption: self.non_negative(
                "annual_consumption",
                raw.annual_consumption.as_ref(),
                fallback.annual_consumption,
            ),
            credit_interest_rate: self.non_negative(
                "credit_interest_rate",
                raw.credit_interest_rate.as_ref(),
                fallback.credit_interest_rate,
            ),
            insurance_rate: self.non_negative(
                "insurance_rate",
                raw.insurance_rate.as_ref(),
                fallback.insurance_rate,
            ),
            projection_years,
        }
    }
}

impl SimulationParams {
    /// Coerce raw form values using the documented defaults as fallback
    pub fn from_raw(raw: &RawSimulationParams) -> Self {
        Self::from_raw_with_fallback(raw, &SimulationParams::default())
    }

    /// Coerce raw form values, falling back field by field on `fallback`
    pub fn from_raw_with_fallback(raw: &RawSimulationParams, fallback: &SimulationParams) -> Self {
        Self::coerce_reporting(raw, fallback).0
    }

    /// Like [`Self::from_raw_with_fallback`], also naming the fields whose
    /// value was unusable and replaced by the fallback
    pub fn coerce_reporting(
        raw: &RawSimulationParams,
        fallback: &SimulationParams,
    ) -> (Self, Vec<&'static str>) {
        let mut coercer = Coercer::new(fallback);
        let params = coercer.coerce(raw);
        (params, coercer.rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_text_forms() {
        assert_eq!(parse_numeric(&"0,25".into()), Some(0.25));
        assert_eq!(parse_numeric(&" 18 799 € ".into()), Some(18799.0));
        assert_eq!(parse_numeric(&"3.89%".into()), Some(3.89));
        assert_eq!(parse_numeric(&"".into()), None);
        assert_eq!(parse_numeric(&"abc".into()), None);
        assert_eq!(parse_numeric(&"NaN".into()), None);
        assert_eq!(parse_numeric(&NumericInput::Number(f64::INFINITY)), None);
    }

    #[test]
    fn test_empty_raw_gives_defaults() {
        let params = SimulationParams::from_raw(&RawSimulationParams::default());
        assert_eq!(params, SimulationParams::default());
    }

    #[test]
    fn test_unusable_values_fall_back_field_by_field() {
        let last_good = SimulationParams {
            install_cost: 12_000.0,
            ..Default::default()
        };
        let raw = RawSimulationParams {
            install_cost: Some("douze mille".into()),
            electricity_price: Some("0,30".into()),
            ..Default::default()
        };

        let (params, rejected) = SimulationParams::coerce_reporting(&raw, &last_good);
        assert_eq!(params.install_cost, 12_000.0);
        assert_eq!(params.electricity_price, 0.30);
        assert_eq!(rejected, vec!["install_cost"]);
    }

    #[test]
    fn test_clamped_values_are_not_rejections() {
        let raw = RawSimulationParams {
            self_consumption_rate: Some(NumericInput::Number(140.0)),
            install_cost: Some(NumericInput::Number(-5.0)),
            projection_years: Some("".into()),
            ..Default::default()
        };

        let (params, rejected) = SimulationParams::coerce_reporting(&raw, &SimulationParams::default());
        assert_eq!(params.self_consumption_rate, 100.0);
        assert_eq!(params.install_cost, 0.0);
        assert_eq!(params.projection_years, 20);
        assert_eq!(rejected, vec!["projection_years"]);
    }

    #[test]
    fn test_clamping() {
        let raw = RawSimulationParams {
            self_consumption_rate: Some(NumericInput::Number(140.0)),
            projection_years: Some(NumericInput::Number(0.0)),
            install_cost: Some(NumericInput::Number(-5.0)),
            inflation_rate: Some(NumericInput::Number(-250.0)),
            credit_duration_months: Some("179.6".into()),
            ..Default::default()
        };

        let params = SimulationParams::from_raw(&raw);
        assert_eq!(params.self_consumption_rate, 100.0);
        assert_eq!(params.projection_years, 1);
        assert_eq!(params.install_cost, 0.0);
        assert_eq!(params.inflation_rate, -99.0);
        assert_eq!(params.credit_duration_months, 180);
    }

    #[test]
    fn test_round_trip_through_raw() {
        let params = SimulationParams {
            inflation_rate: 3.5,
            projection_years: 25,
            ..Default::default()
        };
        assert_eq!(SimulationParams::from_raw(&params.to_raw()), params);
    }
}
