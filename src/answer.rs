use crate::rational::Rational;

/// Absolute tolerance for the floating-point fallback path.
const TOLERANCE: f64 = 1e-3;

/// Judge a submitted answer against the canonical expected answer.
///
/// Fraction answers are compared exactly after reduction, so `"2/4"`
/// matches `"1/2"`, with a float fallback for decimal submissions like
/// `"0.5"`. Everything else is compared as floats within `TOLERANCE`.
/// Arbitrary user text is never an error; it just fails to match.
pub fn is_correct(submitted: &str, expected: &str) -> bool {
    let submitted = submitted.trim();
    if submitted.is_empty() {
        return false;
    }
    if expected.contains('/') {
        let Some(expected_frac) = Rational::parse(expected) else {
            return false;
        };
        if let Some(submitted_frac) = Rational::parse(submitted) {
            if submitted_frac == expected_frac {
                return true;
            }
        }
        return close_enough(submitted, expected_frac.to_f64());
    }
    match expected.parse::<f64>() {
        Ok(expected_val) => close_enough(submitted, expected_val),
        Err(_) => false,
    }
}

fn close_enough(submitted: &str, expected: f64) -> bool {
    submitted
        .parse::<f64>()
        .map(|v| (v - expected).abs() < TOLERANCE)
        .unwrap_or(false)
}
