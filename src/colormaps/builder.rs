//! Derived colormaps: clipping a sub-range and stacking two ramps.
//!
//! Bounds are applied literally. Clipping a diverging ramp unequally from
//! both ends moves its neutral point; callers wanting a centered result
//! must clip symmetrically.

use tracing::debug;

use super::colormap::{Colormap, Ramp, Rgba, WHITE};
use crate::error::{HadleyError, Result};
use crate::logging::log_timed_operation;

/// Sample count used when clipping a ramp
pub const DEFAULT_SAMPLES: usize = 256;

/// Sampling parameters for [`combine`] and [`combine_with_center`]
#[derive(Debug, Clone, PartialEq)]
pub struct CombineOptions {
    /// Sub-range of the lower ramp to sample
    pub range_low: [f64; 2],
    /// Sub-range of the upper ramp to sample
    pub range_up: [f64; 2],
    /// Number of samples taken from the lower ramp
    pub n_low: usize,
    /// Number of samples taken from the upper ramp
    pub n_up: usize,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            range_low: [0.0, 1.0],
            range_up: [0.0, 1.0],
            n_low: 128,
            n_up: 128,
        }
    }
}

impl CombineOptions {
    /// Set both sampled sub-ranges
    pub fn ranges(mut self, range_low: [f64; 2], range_up: [f64; 2]) -> Self {
        self.range_low = range_low;
        self.range_up = range_up;
        self
    }

    /// Set both sample counts
    pub fn counts(mut self, n_low: usize, n_up: usize) -> Self {
        self.n_low = n_low;
        self.n_up = n_up;
        self
    }
}

/// `n` evenly spaced values from `start` to `stop` inclusive
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            // Pin the endpoint against accumulated rounding
            values[n - 1] = stop;
            values
        }
    }
}

/// Check `0 <= lo < hi <= 1`
pub fn validate_range(lo: f64, hi: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) {
        return Err(HadleyError::InvalidRange {
            message: format!("bounds [{}, {}] must lie within [0, 1]", lo, hi),
        });
    }
    if lo >= hi {
        return Err(HadleyError::InvalidRange {
            message: format!("lower bound {} must be less than upper bound {}", lo, hi),
        });
    }
    Ok(())
}

/// Sample `n` colors evenly over `[lo, hi]` of a colormap
fn sample_range<C: Colormap + ?Sized>(cmap: &C, range: [f64; 2], n: usize) -> Result<Vec<Rgba>> {
    validate_range(range[0], range[1])?;
    Ok(cmap.sample_many(&linspace(range[0], range[1], n)))
}

/// Restrict a colormap to `[lo, hi]`, resampled at [`DEFAULT_SAMPLES`] points
pub fn clip<C: Colormap + ?Sized>(cmap: &C, lo: f64, hi: f64) -> Result<Ramp> {
    clip_with_samples(cmap, lo, hi, DEFAULT_SAMPLES)
}

/// Restrict a colormap to `[lo, hi]`, resampled at `n` points
///
/// The result is a discrete ramp whose first sample is the source at `lo`
/// and whose last sample is the source at `hi`.
pub fn clip_with_samples<C: Colormap + ?Sized>(
    cmap: &C,
    lo: f64,
    hi: f64,
    n: usize,
) -> Result<Ramp> {
    log_timed_operation("clip", || {
        let samples = sample_range(cmap, [lo, hi], n)?;
        debug!(source = cmap.name(), lo, hi, samples = n, "Clipped colormap");
        Ramp::listed(format!("{}_clip", cmap.name()), samples)
    })
}

/// Stack two colormaps, lower colors first
///
/// Using the same `n_low` and `n_up` centers the join of the two ramps.
pub fn combine<L, U>(low: &L, up: &U, options: &CombineOptions) -> Result<Ramp>
where
    L: Colormap + ?Sized,
    U: Colormap + ?Sized,
{
    combine_with_center(low, up, options, 0)
}

/// Stack two colormaps with `n_white` opaque white samples between them
pub fn combine_with_center<L, U>(
    low: &L,
    up: &U,
    options: &CombineOptions,
    n_white: usize,
) -> Result<Ramp>
where
    L: Colormap + ?Sized,
    U: Colormap + ?Sized,
{
    log_timed_operation("combine", || {
        let lower = sample_range(low, options.range_low, options.n_low)?;
        let upper = sample_range(up, options.range_up, options.n_up)?;

        let mut colors = Vec::with_capacity(lower.len() + n_white + upper.len());
        colors.extend(lower);
        colors.extend(std::iter::repeat(WHITE).take(n_white));
        colors.extend(upper);

        debug!(
            low = low.name(),
            up = up.name(),
            n_low = options.n_low,
            n_up = options.n_up,
            n_white,
            "Combined colormaps"
        );

        Ramp::linear(format!("{}_{}", low.name(), up.name()), colors)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormaps::get_colormap;

    fn assert_color_close(a: Rgba, b: Rgba) {
        for i in 0..4 {
            assert!((a[i] - b[i]).abs() < 1e-9, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_linspace() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.3, 1.0, 1), vec![0.3]);
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(-6.0, 6.0, 25)[12], 0.0);
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(0.0, 1.0).is_ok());
        assert!(validate_range(0.5, 0.51).is_ok());
        assert!(validate_range(0.5, 0.5).is_err());
        assert!(validate_range(0.8, 0.2).is_err());
        assert!(validate_range(-0.1, 0.5).is_err());
        assert!(validate_range(0.5, 1.2).is_err());
    }

    #[test]
    fn test_clip_endpoints() {
        let source = get_colormap("delta").unwrap();
        for (lo, hi) in [(0.0, 1.0), (0.5, 1.0), (0.1, 0.95), (0.25, 0.3)] {
            let clipped = clip(&source, lo, hi).unwrap();
            assert_eq!(clipped.len(), DEFAULT_SAMPLES);
            assert_color_close(clipped.samples()[0], source.sample(lo));
            assert_color_close(clipped.samples()[DEFAULT_SAMPLES - 1], source.sample(hi));
        }
    }

    #[test]
    fn test_clip_rejects_reversed_bounds() {
        let source = get_colormap("delta").unwrap();
        assert!(matches!(
            clip(&source, 0.9, 0.1),
            Err(HadleyError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_combine_rejects_invalid_ranges() {
        let low = get_colormap("brbg").unwrap();
        let up = get_colormap("blues").unwrap();

        let cases = [
            ([0.5, 0.2], [0.0, 1.0]),
            ([0.0, 1.0], [0.0, 1.2]),
            ([-0.1, 0.5], [0.0, 1.0]),
            ([0.0, 1.0], [0.7, 0.7]),
        ];
        for (range_low, range_up) in cases {
            let options = CombineOptions::default().ranges(range_low, range_up);
            assert!(
                matches!(combine(&low, &up, &options), Err(HadleyError::InvalidRange { .. })),
                "{:?} {:?}",
                range_low,
                range_up
            );
            assert!(matches!(
                combine_with_center(&low, &up, &options, 3),
                Err(HadleyError::InvalidRange { .. })
            ));
        }
    }

    #[test]
    fn test_combine_layout() {
        let low = get_colormap("brbg").unwrap();
        let up = get_colormap("blues").unwrap();
        let options = CombineOptions::default().ranges([0.0, 0.5], [0.0, 0.95]);

        let combined = combine(&low, &up, &options).unwrap();
        assert_eq!(combined.len(), 256);
        assert_eq!(combined.name(), "brbg_blues");
        assert_color_close(combined.samples()[0], low.sample(0.0));
        assert_color_close(combined.samples()[127], low.sample(0.5));
        assert_color_close(combined.samples()[128], up.sample(0.0));
        assert_color_close(combined.samples()[255], up.sample(0.95));
    }

    #[test]
    fn test_combine_self_matches_double_sampling() {
        let ramp = get_colormap("viridis").unwrap();
        let options = CombineOptions::default().counts(16, 16);
        let combined = combine(&ramp, &ramp, &options).unwrap();

        let once = ramp.sample_many(&linspace(0.0, 1.0, 16));
        let twice: Vec<Rgba> = once.iter().chain(once.iter()).copied().collect();
        assert_eq!(combined.samples(), twice.as_slice());
    }

    #[test]
    fn test_center_band() {
        let low = get_colormap("brbg").unwrap();
        let up = get_colormap("delta_r").unwrap();
        let options = CombineOptions::default().ranges([0.0, 0.5], [0.51, 1.0]);

        let centered = combine_with_center(&low, &up, &options, 3).unwrap();
        assert_eq!(centered.len(), 128 + 3 + 128);
        for i in 128..131 {
            assert_eq!(centered.samples()[i], WHITE);
        }

        let plain = combine(&low, &up, &options).unwrap();
        let no_band = combine_with_center(&low, &up, &options, 0).unwrap();
        assert_eq!(plain, no_band);
    }

    #[test]
    fn test_all_empty_combination() {
        let ramp = get_colormap("gray").unwrap();
        let options = CombineOptions::default().counts(0, 0);
        assert!(matches!(
            combine(&ramp, &ramp, &options),
            Err(HadleyError::EmptyRamp)
        ));
        // A band alone is still a valid ramp
        let band = combine_with_center(&ramp, &ramp, &options, 2).unwrap();
        assert_eq!(band.sample(0.3), WHITE);
    }
}
