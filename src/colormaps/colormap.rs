//! Colormap trait and the discrete [`Ramp`] type.
//!
//! This module defines the common interface for all colormaps and the
//! registry of named palettes.

use crate::error::{HadleyError, Result};

/// An RGBA color with channels in `[0, 1]`
pub type Rgba = [f64; 4];

/// Opaque white, used for neutral bands
pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

/// Color returned for NaN positions
pub const TRANSPARENT: Rgba = [0.0, 0.0, 0.0, 0.0];

/// Trait for color mapping implementations
pub trait Colormap: Send + Sync {
    /// Map a normalized position (0.0 to 1.0) to an RGBA color
    fn sample(&self, position: f64) -> Rgba;

    /// Map a value to an RGBA color given the data range
    fn map(&self, value: f64, min: f64, max: f64) -> Rgba {
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.sample(normalized)
    }

    /// Sample the colormap at each of the given positions
    fn sample_many(&self, positions: &[f64]) -> Vec<Rgba> {
        positions.iter().map(|&p| self.sample(p)).collect()
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// How a ramp turns a continuous position into a color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampMode {
    /// Interpolate linearly between neighbouring samples
    Linear,
    /// Pick the sample whose bin contains the position
    Listed,
}

/// An immutable, ordered sequence of color samples
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp {
    name: String,
    samples: Vec<Rgba>,
    mode: RampMode,
}

impl Ramp {
    /// Build a continuous ramp interpolating across evenly spaced samples
    pub fn linear(name: impl Into<String>, samples: Vec<Rgba>) -> Result<Self> {
        Self::new(name, samples, RampMode::Linear)
    }

    /// Build a discrete ramp with one equal-width bin per sample
    pub fn listed(name: impl Into<String>, samples: Vec<Rgba>) -> Result<Self> {
        Self::new(name, samples, RampMode::Listed)
    }

    fn new(name: impl Into<String>, samples: Vec<Rgba>, mode: RampMode) -> Result<Self> {
        if samples.is_empty() {
            return Err(HadleyError::EmptyRamp);
        }
        Ok(Self {
            name: name.into(),
            samples,
            mode,
        })
    }

    /// Build a linear ramp from opaque 8-bit RGB anchors
    pub fn from_rgb8(name: impl Into<String>, anchors: &[[u8; 3]]) -> Result<Self> {
        let samples = anchors
            .iter()
            .map(|c| {
                [
                    c[0] as f64 / 255.0,
                    c[1] as f64 / 255.0,
                    c[2] as f64 / 255.0,
                    1.0,
                ]
            })
            .collect();
        Self::linear(name, samples)
    }

    /// Discretize a `colorgrad` gradient into `n` evenly spaced samples
    pub fn from_gradient(
        name: impl Into<String>,
        gradient: &colorgrad::Gradient,
        n: usize,
    ) -> Result<Self> {
        let (dmin, dmax) = gradient.domain();
        let samples = super::builder::linspace(0.0, 1.0, n)
            .into_iter()
            .map(|t| {
                let c = gradient.at(dmin + t * (dmax - dmin));
                [c.r, c.g, c.b, c.a]
            })
            .collect();
        Self::linear(name, samples)
    }

    /// The same samples in reverse order, named with an `_r` suffix
    pub fn reversed(&self) -> Self {
        let name = match self.name.strip_suffix("_r") {
            Some(base) => base.to_string(),
            None => format!("{}_r", self.name),
        };
        let mut samples = self.samples.clone();
        samples.reverse();
        Self {
            name,
            samples,
            mode: self.mode,
        }
    }

    /// Rename the ramp
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The discrete samples backing this ramp
    pub fn samples(&self) -> &[Rgba] {
        &self.samples
    }

    /// Number of discrete samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; ramps hold at least one sample
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Position-to-color mode
    pub fn mode(&self) -> RampMode {
        self.mode
    }
}

impl Colormap for Ramp {
    fn sample(&self, position: f64) -> Rgba {
        if position.is_nan() {
            return TRANSPARENT;
        }
        let t = position.clamp(0.0, 1.0);
        let n = self.samples.len();

        match self.mode {
            RampMode::Listed => {
                let index = ((t * n as f64).floor() as usize).min(n - 1);
                self.samples[index]
            }
            RampMode::Linear => {
                if n == 1 {
                    return self.samples[0];
                }
                let position = t * (n - 1) as f64;
                let index = position.floor() as usize;
                if index >= n - 1 {
                    return self.samples[n - 1];
                }
                let frac = position - index as f64;
                lerp_color(self.samples[index], self.samples[index + 1], frac)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Linear interpolation between two colors
pub fn lerp_color(c1: Rgba, c2: Rgba, t: f64) -> Rgba {
    [
        c1[0] * (1.0 - t) + c2[0] * t,
        c1[1] * (1.0 - t) + c2[1] * t,
        c1[2] * (1.0 - t) + c2[2] * t,
        c1[3] * (1.0 - t) + c2[3] * t,
    ]
}

/// Convert a color to 8-bit channels
pub fn to_rgba8(color: Rgba) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Get a colormap by name
///
/// A trailing `_r` returns the reversed map, matching the matplotlib naming
/// convention.
pub fn get_colormap(name: &str) -> Result<Ramp> {
    use super::palettes::*;

    let lower = name.to_lowercase();
    if let Some(base) = lower.strip_suffix("_r") {
        return Ok(get_colormap(base)?.reversed());
    }

    let n = super::builder::DEFAULT_SAMPLES;
    match lower.as_str() {
        "blues" => Ramp::from_gradient("blues", &colorgrad::blues(), n),
        "brbg" => Ramp::from_gradient("brbg", &colorgrad::br_bg(), n),
        "bupu" => Ramp::from_gradient("bupu", &colorgrad::bu_pu(), n),
        "rdbu" => Ramp::from_gradient("rdbu", &colorgrad::rd_bu(), n),
        "rdylbu" => Ramp::from_gradient("rdylbu", &colorgrad::rd_yl_bu(), n),
        "ylorbr" => Ramp::from_gradient("ylorbr", &colorgrad::yl_or_br(), n),
        "ylgnbu" => Ramp::from_gradient("ylgnbu", &colorgrad::yl_gn_bu(), n),
        "greys" => Ramp::from_gradient("greys", &colorgrad::greys(), n),
        "viridis" => Ramp::from_gradient("viridis", &colorgrad::viridis(), n),
        "plasma" => Ramp::from_gradient("plasma", &colorgrad::plasma(), n),
        "inferno" => Ramp::from_gradient("inferno", &colorgrad::inferno(), n),
        "magma" => Ramp::from_gradient("magma", &colorgrad::magma(), n),
        "cividis" => Ramp::from_gradient("cividis", &colorgrad::cividis(), n),
        "spectral" => Ramp::from_gradient("spectral", &colorgrad::spectral(), n),
        "coolwarm" => Ramp::from_rgb8("coolwarm", COOLWARM),
        "seismic" => Ramp::from_rgb8("seismic", SEISMIC),
        "bone" => Ramp::from_rgb8("bone", BONE),
        "afmhot" => Ramp::from_rgb8("afmhot", AFMHOT),
        "twilight_shifted" => Ramp::from_rgb8("twilight_shifted", TWILIGHT_SHIFTED),
        "gray" => Ramp::from_rgb8("gray", GRAY),
        "matter" => Ramp::from_rgb8("matter", MATTER),
        "tempo" => Ramp::from_rgb8("tempo", TEMPO),
        "delta" => Ramp::from_rgb8("delta", DELTA),
        "curl" => Ramp::from_rgb8("curl", CURL),
        "amp" => Ramp::from_rgb8("amp", AMP),
        "ice" => Ramp::from_rgb8("ice", ICE),
        "diff" => Ramp::from_rgb8("diff", DIFF),
        "thermal" => Ramp::from_rgb8("thermal", THERMAL),
        "topo" => Ramp::from_rgb8("topo", TOPO),
        "deep" => Ramp::from_rgb8("deep", DEEP),
        _ => Err(HadleyError::InvalidParameter {
            param: "colormap".to_string(),
            message: format!("Unknown colormap: {}", name),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_white() -> Ramp {
        Ramp::linear("bw", vec![[0.0, 0.0, 0.0, 1.0], WHITE]).unwrap()
    }

    #[test]
    fn test_lerp_color() {
        let mid = lerp_color([0.0, 0.0, 0.0, 1.0], WHITE, 0.5);
        assert_eq!(mid, [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_empty_ramp_rejected() {
        assert!(matches!(
            Ramp::linear("empty", vec![]),
            Err(HadleyError::EmptyRamp)
        ));
    }

    #[test]
    fn test_linear_sampling() {
        let ramp = black_white();
        assert_eq!(ramp.sample(0.0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(ramp.sample(1.0), WHITE);
        assert_eq!(ramp.sample(0.25), [0.25, 0.25, 0.25, 1.0]);
        // Out-of-range positions clamp
        assert_eq!(ramp.sample(-3.0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(ramp.sample(7.0), WHITE);
        assert_eq!(ramp.sample(f64::NAN), TRANSPARENT);
    }

    #[test]
    fn test_listed_sampling() {
        let red = [1.0, 0.0, 0.0, 1.0];
        let blue = [0.0, 0.0, 1.0, 1.0];
        let ramp = Ramp::listed("rb", vec![red, blue]).unwrap();
        assert_eq!(ramp.sample(0.0), red);
        assert_eq!(ramp.sample(0.49), red);
        assert_eq!(ramp.sample(0.5), blue);
        assert_eq!(ramp.sample(1.0), blue);
    }

    #[test]
    fn test_single_sample_is_constant() {
        let ramp = Ramp::linear("one", vec![WHITE]).unwrap();
        assert_eq!(ramp.sample(0.0), WHITE);
        assert_eq!(ramp.sample(0.7), WHITE);
    }

    #[test]
    fn test_map_uses_data_range() {
        let ramp = black_white();
        assert_eq!(ramp.map(5.0, 0.0, 10.0), [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(ramp.map(20.0, 0.0, 10.0), WHITE);
        assert_eq!(ramp.map(1.0, 3.0, 3.0), [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_reversed() {
        let ramp = black_white();
        let reversed = ramp.reversed();
        assert_eq!(reversed.name(), "bw_r");
        assert_eq!(reversed.sample(0.0), WHITE);
        assert_eq!(reversed.reversed(), ramp);
    }

    #[test]
    fn test_to_rgba8() {
        assert_eq!(to_rgba8(WHITE), [255, 255, 255, 255]);
        assert_eq!(to_rgba8([0.5, 0.0, 2.0, -1.0]), [128, 0, 255, 0]);
    }

    #[test]
    fn test_get_colormap() {
        let blues = get_colormap("Blues").unwrap();
        assert_eq!(blues.len(), 256);
        // Light at the bottom, dark blue at the top
        let low = blues.sample(0.0);
        let high = blues.sample(1.0);
        assert!(low[0] > high[0]);
        assert!(high[2] > high[0]);

        let seismic = get_colormap("seismic").unwrap();
        assert_eq!(to_rgba8(seismic.sample(0.5)), [255, 255, 255, 255]);

        let reversed = get_colormap("RdYlBu_r").unwrap();
        assert_eq!(reversed.name(), "rdylbu_r");

        assert!(matches!(
            get_colormap("not_a_map"),
            Err(HadleyError::InvalidParameter { .. })
        ));
    }
}
