//! Log-space summation helpers for the inside/outside passes.

/// `ln(e^a + e^b)`, stable for `-inf` operands (an unreachable DP cell
/// contributes nothing to the sum rather than producing `NaN`).
#[must_use]
pub fn log_add(a: f64, b: f64) -> f64 {
    if a.is_infinite() && a.is_sign_negative() {
        return b;
    }
    if b.is_infinite() && b.is_sign_negative() {
        return a;
    }
    let (hi, lo) = if a > b { (a, b) } else { (b, a) };
    hi + (lo - hi).exp().ln_1p()
}

#[must_use]
pub fn log_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(f64::NEG_INFINITY, log_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_add_matches_direct_computation() {
        let a = 1.0_f64.ln();
        let b = 2.0_f64.ln();
        assert!((log_add(a, b).exp() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn log_add_with_neg_infinity_returns_the_other_operand() {
        assert_eq!(log_add(f64::NEG_INFINITY, 5.0), 5.0);
        assert_eq!(log_add(5.0, f64::NEG_INFINITY), 5.0);
    }

    #[test]
    fn log_sum_of_empty_is_neg_infinity() {
        assert_eq!(log_sum(Vec::<f64>::new()), f64::NEG_INFINITY);
    }
}
