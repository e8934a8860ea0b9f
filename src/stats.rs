//! Two-sample significance testing of gridded differences.
//!
//! Samples are stacked along axis 0 (one entry per year, see
//! [`crate::climatology::stack_years`]); every remaining cell is tested
//! independently. Differences are masked where the two-sided p-value exceeds
//! [`SIGNIFICANCE_THRESHOLD`].

use ndarray::{ArrayD, ArrayView1, Axis, Zip};
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

use crate::error::{HadleyError, Result};
use crate::logging::log_timed_operation;

/// p-value above which a difference is considered not significant
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.1;

/// An array paired with a mask; `true` marks a suppressed value
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    data: ArrayD<f64>,
    mask: ArrayD<bool>,
}

impl MaskedArray {
    pub fn new(data: ArrayD<f64>, mask: ArrayD<bool>) -> Result<Self> {
        if data.shape() != mask.shape() {
            return Err(HadleyError::ShapeMismatch {
                message: format!(
                    "Mask shape {:?} does not match data shape {:?}",
                    mask.shape(),
                    data.shape()
                ),
            });
        }
        Ok(Self { data, mask })
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn mask(&self) -> &ArrayD<bool> {
        &self.mask
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Value at `index`, or `None` when masked or out of bounds
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        match self.mask.get(index) {
            Some(false) => self.data.get(index).copied(),
            _ => None,
        }
    }

    /// Copy of the data with masked cells replaced by `fill`
    pub fn filled(&self, fill: f64) -> ArrayD<f64> {
        Zip::from(&self.data)
            .and(&self.mask)
            .map_collect(|&v, &m| if m { fill } else { v })
    }

    pub fn count_masked(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }
}

/// Outcome of a cell-wise significance test
#[derive(Debug, Clone, PartialEq)]
pub struct SignificanceResult {
    /// `mean_a - mean_b`
    pub diff: ArrayD<f64>,
    /// `diff` masked where the test is not significant
    pub masked_diff: MaskedArray,
    /// t statistic per cell
    pub statistic: ArrayD<f64>,
    /// Two-sided p-value per cell
    pub p_value: ArrayD<f64>,
}

/// Sample mean and unbiased variance
fn mean_var(x: ArrayView1<f64>) -> (f64, f64) {
    let n = x.len() as f64;
    let mean = x.sum() / n;
    let ss = x.fold(0.0, |acc, &v| acc + (v - mean) * (v - mean));
    (mean, ss / (n - 1.0))
}

/// t statistic for `numerator / sqrt(variance_term)`
///
/// A zero variance term gives NaN when the numerator is zero too and an
/// infinite statistic otherwise.
fn guarded_t(numerator: f64, variance_term: f64) -> f64 {
    if variance_term == 0.0 {
        if numerator == 0.0 {
            f64::NAN
        } else {
            numerator.signum() * f64::INFINITY
        }
    } else {
        numerator / variance_term.sqrt()
    }
}

fn two_sided_p(t: f64, dist: Option<&StudentsT>) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    match dist {
        Some(dist) => (2.0 * dist.cdf(-t.abs())).min(1.0),
        None => f64::NAN,
    }
}

fn check_sample_size(which: &str, n: usize) -> Result<()> {
    if n < 2 {
        return Err(HadleyError::Statistics {
            message: format!("Sample {} needs at least 2 entries along axis 0, got {}", which, n),
        });
    }
    Ok(())
}

fn check_mean_shape(which: &str, mean: &ArrayD<f64>, trailing: &[usize]) -> Result<()> {
    if mean.shape() != trailing {
        return Err(HadleyError::ShapeMismatch {
            message: format!(
                "Mean {} has shape {:?}, expected {:?}",
                which,
                mean.shape(),
                trailing
            ),
        });
    }
    Ok(())
}

fn finish(
    mean_a: &ArrayD<f64>,
    mean_b: &ArrayD<f64>,
    tests: ArrayD<(f64, f64)>,
    kind: &str,
) -> Result<SignificanceResult> {
    let diff = mean_a - mean_b;
    let statistic = tests.mapv(|(t, _)| t);
    let p_value = tests.mapv(|(_, p)| p);

    let mask = p_value.mapv(|p| p.is_nan() || p > SIGNIFICANCE_THRESHOLD);
    let masked_diff = MaskedArray::new(diff.clone(), mask)?;

    debug!(
        test = kind,
        cells = diff.len(),
        masked = masked_diff.count_masked(),
        "Significance test complete"
    );

    Ok(SignificanceResult {
        diff,
        masked_diff,
        statistic,
        p_value,
    })
}

/// Paired t-test of `yearly_a` against `yearly_b` along axis 0
///
/// Both samples must have the same shape; entries at the same index along
/// axis 0 form a pair. `mean_a` and `mean_b` give the reported difference
/// and must match the trailing shape of the samples.
pub fn paired_test(
    yearly_a: &ArrayD<f64>,
    yearly_b: &ArrayD<f64>,
    mean_a: &ArrayD<f64>,
    mean_b: &ArrayD<f64>,
) -> Result<SignificanceResult> {
    log_timed_operation("paired_test", || {
        if yearly_a.ndim() == 0 || yearly_a.shape() != yearly_b.shape() {
            return Err(HadleyError::ShapeMismatch {
                message: format!(
                    "Paired samples must share a shape with a leading axis, got {:?} and {:?}",
                    yearly_a.shape(),
                    yearly_b.shape()
                ),
            });
        }
        let n = yearly_a.len_of(Axis(0));
        check_sample_size("a", n)?;
        let trailing = &yearly_a.shape()[1..];
        check_mean_shape("a", mean_a, trailing)?;
        check_mean_shape("b", mean_b, trailing)?;

        let dist = StudentsT::new(0.0, 1.0, (n - 1) as f64).map_err(|e| HadleyError::Statistics {
            message: e.to_string(),
        })?;

        let tests = Zip::from(yearly_a.lanes(Axis(0)))
            .and(yearly_b.lanes(Axis(0)))
            .map_collect(|a, b| {
                let d = &a - &b;
                let (mean, var) = mean_var(d.view());
                let t = guarded_t(mean, var / n as f64);
                (t, two_sided_p(t, Some(&dist)))
            });

        finish(mean_a, mean_b, tests, "paired")
    })
}

/// Welch's unequal-variance t-test of `yearly_a` against `yearly_b`
///
/// The samples may differ in length along axis 0 but must share their
/// trailing shape. Degrees of freedom follow Welch-Satterthwaite.
pub fn independent_test(
    yearly_a: &ArrayD<f64>,
    yearly_b: &ArrayD<f64>,
    mean_a: &ArrayD<f64>,
    mean_b: &ArrayD<f64>,
) -> Result<SignificanceResult> {
    log_timed_operation("independent_test", || {
        if yearly_a.ndim() == 0 || yearly_b.ndim() == 0 || yearly_a.shape()[1..] != yearly_b.shape()[1..] {
            return Err(HadleyError::ShapeMismatch {
                message: format!(
                    "Independent samples must share trailing shape, got {:?} and {:?}",
                    yearly_a.shape(),
                    yearly_b.shape()
                ),
            });
        }
        let na = yearly_a.len_of(Axis(0));
        let nb = yearly_b.len_of(Axis(0));
        check_sample_size("a", na)?;
        check_sample_size("b", nb)?;
        let trailing = &yearly_a.shape()[1..];
        check_mean_shape("a", mean_a, trailing)?;
        check_mean_shape("b", mean_b, trailing)?;

        let (na, nb) = (na as f64, nb as f64);
        let tests = Zip::from(yearly_a.lanes(Axis(0)))
            .and(yearly_b.lanes(Axis(0)))
            .map_collect(|a, b| {
                let (mean_a, var_a) = mean_var(a);
                let (mean_b, var_b) = mean_var(b);
                let sa = var_a / na;
                let sb = var_b / nb;

                let t = guarded_t(mean_a - mean_b, sa + sb);
                let df = (sa + sb).powi(2) / (sa * sa / (na - 1.0) + sb * sb / (nb - 1.0));
                let dist = StudentsT::new(0.0, 1.0, df).ok();
                (t, two_sided_p(t, dist.as_ref()))
            });

        finish(mean_a, mean_b, tests, "welch")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    fn column(values: &[f64]) -> ArrayD<f64> {
        ArrayD::from_shape_vec(IxDyn(&[values.len(), 1]), values.to_vec()).unwrap()
    }

    fn scalar_grid(value: f64) -> ArrayD<f64> {
        ArrayD::from_elem(IxDyn(&[1]), value)
    }

    #[test]
    fn test_paired_significant_at_ten_percent() {
        let a = column(&[1.0, 2.0, 3.0]);
        let b = column(&[0.0, 0.0, 0.0]);
        let result = paired_test(&a, &b, &scalar_grid(2.0), &scalar_grid(0.0)).unwrap();

        assert!((result.statistic[[0]] - 3.464_101_615).abs() < 1e-6);
        assert!((result.p_value[[0]] - 0.074_18).abs() < 1e-4);
        assert_eq!(result.diff[[0]], 2.0);
        assert_eq!(result.masked_diff.get(&[0]), Some(2.0));
        assert_eq!(result.masked_diff.count_masked(), 0);
    }

    #[test]
    fn test_paired_not_significant_is_masked() {
        let a = column(&[1.0, -1.0, 0.5]);
        let b = column(&[0.0, 0.0, 0.0]);
        let result = paired_test(&a, &b, &scalar_grid(0.1667), &scalar_grid(0.0)).unwrap();

        assert!((result.p_value[[0]] - 0.8075).abs() < 1e-3);
        assert_eq!(result.masked_diff.get(&[0]), None);
        assert_eq!(result.masked_diff.filled(-999.0)[[0]], -999.0);
        assert!((result.diff[[0]] - 0.1667).abs() < 1e-12);
    }

    #[test]
    fn test_welch_unequal_variance() {
        let a = column(&[1.0, 2.0, 3.0]);
        let b = column(&[4.0, 5.0, 6.0]);
        let result = independent_test(&a, &b, &scalar_grid(2.0), &scalar_grid(5.0)).unwrap();

        assert!((result.statistic[[0]] + 3.674_234_614).abs() < 1e-6);
        assert!((result.p_value[[0]] - 0.021_31).abs() < 1e-4);
        assert_eq!(result.masked_diff.get(&[0]), Some(-3.0));
    }

    #[test]
    fn test_welch_accepts_different_lengths() {
        let a = column(&[1.0, 2.0]);
        let b = column(&[1.0, 2.0, 3.0, 4.0]);
        let result = independent_test(&a, &b, &scalar_grid(1.5), &scalar_grid(2.5)).unwrap();
        assert_eq!(result.statistic.shape(), &[1]);
        assert!(result.p_value[[0]] > SIGNIFICANCE_THRESHOLD);
        assert_eq!(result.masked_diff.get(&[0]), None);
        assert_eq!(result.masked_diff.count_masked(), 1);
    }

    #[test]
    fn test_zero_variance_is_guarded() {
        // Constant non-zero difference: infinitely significant
        let a = column(&[3.0, 3.0, 3.0]);
        let b = column(&[1.0, 1.0, 1.0]);
        let result = paired_test(&a, &b, &scalar_grid(3.0), &scalar_grid(1.0)).unwrap();
        assert!(result.statistic[[0]].is_infinite());
        assert_eq!(result.p_value[[0]], 0.0);
        assert_eq!(result.masked_diff.get(&[0]), Some(2.0));

        // Identical samples: undefined and masked
        let result = paired_test(&a, &a, &scalar_grid(3.0), &scalar_grid(3.0)).unwrap();
        assert!(result.statistic[[0]].is_nan());
        assert!(result.p_value[[0]].is_nan());
        assert_eq!(result.masked_diff.count_masked(), 1);
    }

    #[test]
    fn test_cells_are_independent() {
        // Two cells per year: one significant, one not
        let a = ArrayD::from_shape_vec(IxDyn(&[3, 2]), vec![1.0, 1.0, 2.0, -1.0, 3.0, 0.5]).unwrap();
        let b = ArrayD::zeros(IxDyn(&[3, 2]));
        let mean_a = ArrayD::from_shape_vec(IxDyn(&[2]), vec![2.0, 0.1667]).unwrap();
        let mean_b = ArrayD::zeros(IxDyn(&[2]));

        let result = paired_test(&a, &b, &mean_a, &mean_b).unwrap();
        assert_eq!(result.masked_diff.mask().iter().copied().collect::<Vec<_>>(), vec![false, true]);
    }

    #[test]
    fn test_shape_checks() {
        let a = column(&[1.0, 2.0, 3.0]);
        let short = column(&[1.0, 2.0]);
        let one = column(&[1.0]);
        let m = scalar_grid(0.0);
        let wrong = ArrayD::zeros(IxDyn(&[2]));

        assert!(matches!(paired_test(&a, &short, &m, &m), Err(HadleyError::ShapeMismatch { .. })));
        assert!(matches!(paired_test(&a, &a, &wrong, &m), Err(HadleyError::ShapeMismatch { .. })));
        assert!(matches!(paired_test(&one, &one, &m, &m), Err(HadleyError::Statistics { .. })));
        assert!(matches!(independent_test(&a, &one, &m, &m), Err(HadleyError::Statistics { .. })));

        let other_grid = ArrayD::zeros(IxDyn(&[3, 2]));
        assert!(matches!(
            independent_test(&a, &other_grid, &m, &m),
            Err(HadleyError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_masked_array_rejects_mismatched_mask() {
        let data = ArrayD::zeros(IxDyn(&[2, 2]));
        let mask = ArrayD::from_elem(IxDyn(&[4]), false);
        assert!(MaskedArray::new(data, mask).is_err());
    }
}
