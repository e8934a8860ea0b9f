//! Floating-point comparisons for reduced fields, where NaN marks a cell
//! without valid data and compares equal to NaN.

/// Tolerance used when none is given
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// `None` when the values match within `epsilon`, otherwise their distance
fn mismatch(actual: f64, expected: f64, epsilon: f64) -> Option<f64> {
    if actual.is_nan() && expected.is_nan() {
        return None;
    }
    let diff = (actual - expected).abs();
    // NaN against a number yields a NaN diff, which must fail
    if diff <= epsilon {
        None
    } else {
        Some(diff)
    }
}

/// Assert `|actual - expected| <= epsilon` (default [`DEFAULT_EPSILON`])
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    if let Some(diff) = mismatch(actual, expected, epsilon) {
        panic!(
            "expected {} but got {} (diff {}, epsilon {})",
            expected, actual, diff, epsilon
        );
    }
}

/// Element-wise [`assert_approx_eq`] over two slices of equal length
pub fn assert_array_approx_eq(actual: &[f64], expected: &[f64], epsilon: Option<f64>) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "length mismatch: got {:?}, expected {:?}",
        actual,
        expected
    );

    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        if let Some(diff) = mismatch(a, e, epsilon) {
            panic!(
                "index {}: expected {} but got {} (diff {}, epsilon {})",
                i, e, a, diff, epsilon
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_cells_compare_equal() {
        assert_approx_eq(f64::NAN, f64::NAN, None);
        assert_array_approx_eq(&[1.0, f64::NAN], &[1.0000001, f64::NAN], None);
    }

    #[test]
    #[should_panic(expected = "expected 280")]
    fn test_missing_cell_against_value_fails() {
        assert_approx_eq(f64::NAN, 280.0, None);
    }

    #[test]
    #[should_panic(expected = "index 2")]
    fn test_array_reports_first_bad_index() {
        assert_array_approx_eq(&[1.0, 2.0, 3.5], &[1.0, 2.0, 3.0], Some(0.1));
    }
}
