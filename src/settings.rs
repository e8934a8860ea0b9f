//! Plot settings for common climate model fields.
//!
//! Every field kind maps to an immutable [`FieldSettings`] record, one for
//! absolute values and one for differences between experiments. Field names
//! are resolved through a fixed alias table; names outside it are an error.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::colormaps::{
    clip, combine, combine_with_center, get_colormap, linspace, Colormap, CombineOptions, Ramp,
    Rgba, DEFAULT_SAMPLES, TRANSPARENT,
};
use crate::error::{HadleyError, Result};

/// Canonical field kinds with known plot settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    Precipitation,
    Temperature,
    WindComponent,
    SurfaceWindSpeed,
    WindSpeed,
    MoistureFluxConvergence,
    RelativeHumidity,
    SpecificHumidity,
    Convergence,
    Divergence,
    Omega,
    LatentHeatFlux,
    SensibleHeatFlux,
    CloudFraction,
    ShortwaveFlux,
    LongwaveFlux,
    SeaLevelPressure,
    GeopotentialHeight,
    SeaSurfaceTemperature,
    SeaIce,
    OceanStreamfunction,
    Topography,
    Bathymetry,
}

const ALIASES: &[(FieldKind, &[&str])] = &[
    (FieldKind::Precipitation, &["prec", "precip", "precipitation", "precipiation"]),
    (FieldKind::Temperature, &["ts", "tsurf", "t", "temp", "temperature"]),
    (
        FieldKind::WindComponent,
        &["u", "U", "uwind", "usurf", "v", "V", "vwind", "vsurf"],
    ),
    (
        FieldKind::SurfaceWindSpeed,
        &["sfc_wind_speed", "sfcWind", "sfcwind", "sfc_wind", "wsurf"],
    ),
    (FieldKind::WindSpeed, &["wind", "windSpd", "windspeed", "windSpeed"]),
    (
        FieldKind::MoistureFluxConvergence,
        &["mfc", "moist_flux_convergence", "mfcvg", "mf_cvg", "vimfc"],
    ),
    (FieldKind::RelativeHumidity, &["rh", "rel_hum", "relative_humidity"]),
    (FieldKind::SpecificHumidity, &["qv", "q", "Q", "QV", "specific_humidity"]),
    (FieldKind::Convergence, &["cvg", "convergence"]),
    (FieldKind::Divergence, &["div", "dvg", "divergence"]),
    (FieldKind::Omega, &["omega", "w"]),
    (FieldKind::LatentHeatFlux, &["lh_flux", "LH", "lhf"]),
    (FieldKind::SensibleHeatFlux, &["sh_flux", "SH", "shf"]),
    (
        FieldKind::CloudFraction,
        &["cloud", "cloud_frac", "fcloud", "pcldl", "pcldm", "pcldh", "pcldt"],
    ),
    (FieldKind::ShortwaveFlux, &["sw_flux", "sw_toa", "swcrf"]),
    (FieldKind::LongwaveFlux, &["lw_flux", "lw_toa", "lwcrf"]),
    (FieldKind::SeaLevelPressure, &["slp", "pressure"]),
    (
        FieldKind::GeopotentialHeight,
        &["z200", "z700", "z_200", "z_700", "stationary_wave"],
    ),
    (
        FieldKind::SeaSurfaceTemperature,
        &["sst", "SST", "sea_surface_temperature", "sea_surface_temp"],
    ),
    (FieldKind::SeaIce, &["ice", "seaice", "seaIce", "oicefr"]),
    (
        FieldKind::OceanStreamfunction,
        &[
            "ocean_streamfunction",
            "sf_Atl",
            "sf_atl",
            "sf_pac",
            "sf_ind",
            "sf_Pac",
            "sf_Ind",
            "sf_ocn",
        ],
    ),
    (
        FieldKind::Topography,
        &["topo_real", "topo", "topography", "surface_height", "zatmo", "zsurf"],
    ),
    (FieldKind::Bathymetry, &["bathymetry", "bathy", "depth"]),
];

static ALIAS_MAP: Lazy<HashMap<&'static str, FieldKind>> = Lazy::new(|| {
    ALIASES
        .iter()
        .flat_map(|(kind, names)| names.iter().map(move |name| (*name, *kind)))
        .collect()
});

impl FieldKind {
    /// Resolve a field name; matching is case-sensitive
    pub fn from_alias(name: &str) -> Result<Self> {
        ALIAS_MAP
            .get(name)
            .copied()
            .ok_or_else(|| HadleyError::UnknownField {
                name: name.to_string(),
            })
    }

    /// Every name that resolves to this kind
    pub fn aliases(&self) -> &'static [&'static str] {
        ALIASES
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, names)| *names)
            .unwrap_or(&[])
    }

    /// All field kinds, in table order
    pub fn all() -> impl Iterator<Item = FieldKind> {
        ALIASES.iter().map(|(kind, _)| *kind)
    }

    /// Plot settings for absolute values, or for differences when `diff`
    pub fn settings(&self, diff: bool) -> FieldSettings {
        use ColormapRecipe::*;
        use FieldKind::*;

        let brbg_blues = Combine {
            low: "BrBG",
            up: "Blues",
            range_low: [0.0, 0.5],
            range_up: [0.0, 0.95],
            n_low: 128,
            n_up: 128,
        };
        let ylorbr_tempo = Combine {
            low: "YlOrBr_r",
            up: "tempo",
            range_low: [0.0, 1.0],
            range_up: [0.0, 1.0],
            n_low: 128,
            n_up: 128,
        };

        match (self, diff) {
            (Precipitation, false) => FieldSettings::new(Named("Blues"), 0.0, 10.0, 21),
            (Precipitation, true) => FieldSettings::new(brbg_blues, -6.0, 6.0, 25),

            (Temperature, false) => FieldSettings::new(Named("RdYlBu_r"), -30.0, 30.0, 21),
            (Temperature, true) => FieldSettings::new(Named("RdBu_r"), -10.0, 10.0, 21),

            (WindComponent, false) => FieldSettings::new(
                Combine {
                    low: "YlOrBr_r",
                    up: "BuPu",
                    range_low: [0.0, 1.0],
                    range_up: [0.0, 1.0],
                    n_low: 128,
                    n_up: 128,
                },
                -10.0,
                10.0,
                21,
            ),
            (WindComponent, true) => FieldSettings::new(Named("RdBu_r"), -5.0, 5.0, 11),

            (SurfaceWindSpeed, false) => FieldSettings::new(Named("matter_r"), 0.0, 10.0, 21),
            (SurfaceWindSpeed, true) => FieldSettings::new(Named("RdBu"), -5.0, 5.0, 21),

            (WindSpeed, false) => FieldSettings::new(Named("matter_r"), 5.0, 45.0, 21),
            (WindSpeed, true) => FieldSettings::new(Named("RdBu"), -10.0, 10.0, 21),

            (MoistureFluxConvergence, false) => FieldSettings::new(ylorbr_tempo, -0.00006, 0.00006, 25),
            (MoistureFluxConvergence, true) => FieldSettings::new(ylorbr_tempo, -0.00004, 0.00004, 17),

            (RelativeHumidity, false) => FieldSettings::new(
                Clip {
                    base: "delta_r",
                    lo: 0.5,
                    hi: 1.0,
                },
                0.0,
                100.0,
                21,
            ),
            (RelativeHumidity, true) => FieldSettings::new(brbg_blues, -50.0, 50.0, 21),

            (SpecificHumidity, false) => FieldSettings::new(
                Clip {
                    base: "delta_r",
                    lo: 0.5,
                    hi: 1.0,
                },
                0.0,
                0.1,
                21,
            ),
            (SpecificHumidity, true) => FieldSettings::new(
                CombineWithCenter {
                    low: "BrBG",
                    up: "delta_r",
                    range_low: [0.0, 0.5],
                    range_up: [0.51, 1.0],
                    n_low: 128,
                    n_up: 128,
                    n_white: 3,
                },
                -0.015,
                0.015,
                31,
            ),

            (Convergence, false) => FieldSettings::new(Named("RdBu"), -5e-05, 5e-05, 21),
            (Convergence, true) => FieldSettings::new(Named("RdBu"), -5e-06, 5e-06, 21),

            (Divergence, _) => FieldSettings::new(Named("RdBu_r"), -5e-05, 5e-05, 21),

            (Omega, false) => FieldSettings::new(Named("curl"), -0.1, 0.1, 21),
            (Omega, true) => FieldSettings::new(Named("curl"), -0.05, 0.05, 21),

            (LatentHeatFlux, false) => FieldSettings::new(Named("amp"), 0.0, 300.0, 16),
            (LatentHeatFlux, true) => FieldSettings::new(Named("RdBu_r"), -50.0, 50.0, 21),

            (SensibleHeatFlux, false) => FieldSettings::new(Named("RdBu_r"), -100.0, 100.0, 21),
            (SensibleHeatFlux, true) => FieldSettings::new(Named("RdBu_r"), -20.0, 20.0, 21),

            (CloudFraction, false) => FieldSettings::new(Named("ice"), 0.0, 100.0, 21),
            (CloudFraction, true) => FieldSettings::new(Named("diff_r"), -20.0, 20.0, 21),

            (ShortwaveFlux, false) => FieldSettings::new(Named("thermal_r"), -100.0, 0.0, 21),
            (ShortwaveFlux, true) => FieldSettings::new(
                Combine {
                    low: "gray",
                    up: "amp",
                    range_low: [0.1, 0.95],
                    range_up: [0.0, 0.95],
                    n_low: 128,
                    n_up: 128,
                },
                -50.0,
                50.0,
                21,
            ),

            (LongwaveFlux, false) => FieldSettings::new(Named("thermal"), 0.0, 100.0, 21),
            (LongwaveFlux, true) => FieldSettings::new(
                Combine {
                    low: "bone",
                    up: "amp",
                    range_low: [0.1, 0.95],
                    range_up: [0.0, 0.95],
                    n_low: 128,
                    n_up: 128,
                },
                -50.0,
                50.0,
                21,
            ),

            (SeaLevelPressure, false) => FieldSettings::new(Named("RdBu"), 975.0, 1025.0, 11),
            (SeaLevelPressure, true) => FieldSettings::new(Named("RdBu"), -10.0, 10.0, 11),

            (GeopotentialHeight, false) => FieldSettings::new(Named("seismic"), -150.0, 150.0, 31),
            (GeopotentialHeight, true) => FieldSettings::new(Named("seismic"), -30.0, 30.0, 21),

            (SeaSurfaceTemperature, false) => FieldSettings::new(Named("RdYlBu_r"), -5.0, 30.0, 36),
            (SeaSurfaceTemperature, true) => FieldSettings::new(Named("RdBu_r"), -10.0, 10.0, 21),

            (SeaIce, false) => FieldSettings::new(Named("ice"), 0.0, 100.0, 26),
            (SeaIce, true) => FieldSettings::new(Named("RdBu"), -50.0, 50.0, 26),

            (OceanStreamfunction, false) => FieldSettings::new(Named("YlGnBu"), -10.0, 30.0, 21),
            (OceanStreamfunction, true) => FieldSettings::new(Named("delta_r"), -20.0, 20.0, 21),

            (Topography, false) => FieldSettings::new(
                Clip {
                    base: "topo",
                    lo: 0.5,
                    hi: 1.0,
                },
                0.0,
                5000.0,
                26,
            ),
            (Topography, true) => FieldSettings::new(
                Combine {
                    low: "twilight_shifted",
                    up: "afmhot_r",
                    range_low: [0.0, 0.5],
                    range_up: [0.0, 1.0],
                    n_low: 128,
                    n_up: 128,
                },
                -2000.0,
                2000.0,
                21,
            ),

            (Bathymetry, false) => FieldSettings::new(Named("deep_r"), -4000.0, 0.0, 21),
            (Bathymetry, true) => FieldSettings::new(Named("diff"), -1000.0, 1000.0, 21),
        }
    }
}

impl FromStr for FieldKind {
    type Err = HadleyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_alias(s)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first alias is the conventional short name
        write!(f, "{}", self.aliases().first().copied().unwrap_or("unknown"))
    }
}

/// Static description of how to build a colormap
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColormapRecipe {
    /// A registered colormap, resampled to [`DEFAULT_SAMPLES`] colors
    Named(&'static str),
    /// A sub-range of a registered colormap
    Clip {
        base: &'static str,
        lo: f64,
        hi: f64,
    },
    /// Two registered colormaps stacked
    Combine {
        low: &'static str,
        up: &'static str,
        range_low: [f64; 2],
        range_up: [f64; 2],
        n_low: usize,
        n_up: usize,
    },
    /// Two registered colormaps stacked around a white band
    CombineWithCenter {
        low: &'static str,
        up: &'static str,
        range_low: [f64; 2],
        range_up: [f64; 2],
        n_low: usize,
        n_up: usize,
        n_white: usize,
    },
}

impl ColormapRecipe {
    pub fn build(&self) -> Result<Ramp> {
        match *self {
            ColormapRecipe::Named(name) => {
                let ramp = get_colormap(name)?;
                let samples = ramp.sample_many(&linspace(0.0, 1.0, DEFAULT_SAMPLES));
                Ramp::linear(ramp.name().to_string(), samples)
            }
            ColormapRecipe::Clip { base, lo, hi } => clip(&get_colormap(base)?, lo, hi),
            ColormapRecipe::Combine {
                low,
                up,
                range_low,
                range_up,
                n_low,
                n_up,
            } => {
                let options = CombineOptions::default()
                    .ranges(range_low, range_up)
                    .counts(n_low, n_up);
                combine(&get_colormap(low)?, &get_colormap(up)?, &options)
            }
            ColormapRecipe::CombineWithCenter {
                low,
                up,
                range_low,
                range_up,
                n_low,
                n_up,
                n_white,
            } => {
                let options = CombineOptions::default()
                    .ranges(range_low, range_up)
                    .counts(n_low, n_up);
                combine_with_center(&get_colormap(low)?, &get_colormap(up)?, &options, n_white)
            }
        }
    }
}

/// Colormap, bounds and level count for plotting one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSettings {
    pub cmap: ColormapRecipe,
    pub vmin: f64,
    pub vmax: f64,
    pub levels: usize,
}

impl FieldSettings {
    pub fn new(cmap: ColormapRecipe, vmin: f64, vmax: f64, levels: usize) -> Self {
        Self {
            cmap,
            vmin,
            vmax,
            levels,
        }
    }

    /// Contour levels, evenly spaced from `vmin` to `vmax` inclusive
    pub fn levels(&self) -> Vec<f64> {
        linspace(self.vmin, self.vmax, self.levels)
    }

    pub fn build_colormap(&self) -> Result<Ramp> {
        self.cmap.build()
    }

    /// Discrete normalization over [`FieldSettings::levels`]
    pub fn norm(&self) -> Result<BoundaryNorm> {
        let ramp = self.build_colormap()?;
        BoundaryNorm::new(self.levels(), ramp.len())
    }

    /// Colormap and normalization together, ready to color values
    pub fn color_scale(&self) -> Result<ColorScale> {
        let ramp = self.build_colormap()?;
        let norm = BoundaryNorm::new(self.levels(), ramp.len())?;
        Ok(ColorScale { ramp, norm })
    }
}

/// Look up plot settings by field name
pub fn field_settings(name: &str, diff: bool) -> Result<FieldSettings> {
    let kind = FieldKind::from_alias(name)?;
    debug!(field = name, kind = ?kind, diff, "Resolved field settings");
    Ok(kind.settings(diff))
}

/// Maps values to discrete color indices by the interval they fall in
///
/// With more colors than intervals the indices spread evenly over the full
/// color range. Values below the first boundary take the first color and
/// values at or above the last boundary take the last color.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryNorm {
    boundaries: Vec<f64>,
    ncolors: usize,
}

impl BoundaryNorm {
    pub fn new(boundaries: Vec<f64>, ncolors: usize) -> Result<Self> {
        if boundaries.len() < 2 {
            return Err(HadleyError::InvalidParameter {
                param: "boundaries".to_string(),
                message: format!("Need at least 2 boundaries, got {}", boundaries.len()),
            });
        }
        if boundaries
            .windows(2)
            .any(|w| w[0].partial_cmp(&w[1]) != Some(Ordering::Less))
        {
            return Err(HadleyError::InvalidParameter {
                param: "boundaries".to_string(),
                message: "Boundaries must be strictly increasing".to_string(),
            });
        }
        let regions = boundaries.len() - 1;
        if ncolors < regions {
            return Err(HadleyError::InvalidParameter {
                param: "ncolors".to_string(),
                message: format!("{} colors cannot cover {} intervals", ncolors, regions),
            });
        }
        Ok(Self {
            boundaries,
            ncolors,
        })
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn ncolors(&self) -> usize {
        self.ncolors
    }

    /// Color index for `value`; `None` for NaN
    pub fn index(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let last = self.boundaries.len() - 1;
        if value < self.boundaries[0] {
            return Some(0);
        }
        if value >= self.boundaries[last] {
            return Some(self.ncolors - 1);
        }

        let interval = self.boundaries.partition_point(|&b| b <= value) - 1;
        let regions = last;
        let index = if self.ncolors > regions {
            if regions == 1 {
                (self.ncolors - 1) / 2
            } else {
                ((self.ncolors - 1) as f64 / (regions - 1) as f64 * interval as f64) as usize
            }
        } else {
            interval
        };
        Some(index.min(self.ncolors - 1))
    }
}

/// A ramp paired with the normalization that indexes into it
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    pub ramp: Ramp,
    pub norm: BoundaryNorm,
}

impl ColorScale {
    /// Color for `value`; NaN maps to transparent
    pub fn color(&self, value: f64) -> Rgba {
        match self.norm.index(value) {
            Some(i) => self.ramp.samples()[i.min(self.ramp.len() - 1)],
            None => TRANSPARENT,
        }
    }
}
