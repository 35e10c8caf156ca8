//! Internal rate of return of a yearly investment
//!
//! Flows are indexed by year: `flows[0]` is the outlay at signature (negative),
//! `flows[t]` the gain of year `t`.

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 500;

/// Rate bounds searched (fraction per year)
const MIN_RATE: f64 = -0.99;
const MAX_RATE: f64 = 10.0;

/// Yearly IRR as a fraction (0.08 = 8 %), or `None` when it does not exist
///
/// Newton-Raphson from 5 %, falling back on bisection over
/// [`MIN_RATE`, `MAX_RATE`] when the derivative vanishes or iterations run out.
pub fn internal_rate_of_return(flows: &[f64]) -> Option<f64> {
    if flows.is_empty() || flows.iter().any(|f| !f.is_finite()) {
        return None;
    }

    // A sign change is required for a root to exist
    let has_inflow = flows.iter().any(|&f| f > TOLERANCE);
    let has_outflow = flows.iter().any(|&f| f < -TOLERANCE);
    if !has_inflow || !has_outflow {
        return None;
    }

    let mut rate = 0.05;
    for _ in 0..MAX_ITERATIONS {
        let (npv, slope) = npv_with_slope(flows, rate);
        if slope.abs() < 1e-20 || !slope.is_finite() {
            return bisect(flows);
        }

        let next = (rate - npv / slope).clamp(MIN_RATE, MAX_RATE);
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    bisect(flows)
}

/// Net present value of `flows` at `rate`
pub fn npv(flows: &[f64], rate: f64) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(t, &f)| f / (1.0 + rate).powi(t as i32))
        .sum()
}

fn npv_with_slope(flows: &[f64], rate: f64) -> (f64, f64) {
    let mut value = 0.0;
    let mut slope = 0.0;

    for (t, &f) in flows.iter().enumerate() {
        value += f / (1.0 + rate).powi(t as i32);
        if t > 0 {
            slope -= t as f64 * f / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (value, slope)
}

fn bisect(flows: &[f64]) -> Option<f64> {
    let mut low = MIN_RATE;
    let mut high = MAX_RATE;
    let mut npv_low = npv(flows, low);

    if npv_low * npv(flows, high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(flows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_single_period() {
        let irr = internal_rate_of_return(&[-1000.0, 1100.0]).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-8);
    }

    #[test]
    fn test_level_gains() {
        // 10 years of 1500 on 10 000 invested: IRR ≈ 8.14 %
        let mut flows = vec![-10_000.0];
        flows.extend(vec![1500.0; 10]);

        let irr = internal_rate_of_return(&flows).unwrap();
        assert_abs_diff_eq!(npv(&flows, irr), 0.0, epsilon = 1e-6);
        assert!((irr - 0.0814).abs() < 1e-3, "irr = {}", irr);
    }

    #[test]
    fn test_no_sign_change() {
        assert!(internal_rate_of_return(&[1000.0, 100.0]).is_none());
        assert!(internal_rate_of_return(&[-1000.0, -100.0]).is_none());
        assert!(internal_rate_of_return(&[]).is_none());
        assert!(internal_rate_of_return(&[-1000.0, f64::NAN]).is_none());
    }

    #[test]
    fn test_losing_investment_has_negative_rate() {
        let irr = internal_rate_of_return(&[-1000.0, 300.0, 300.0, 300.0]).unwrap();
        assert!(irr < 0.0);
    }
}
