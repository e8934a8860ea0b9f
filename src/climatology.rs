//! Seasonal climatologies and area-weighted means.
//!
//! Observations are grouped by meteorological season (DJF, MAM, JJA, SON).
//! For per-year means the December of year Y is counted with the January and
//! February of year Y + 1, so each DJF value describes one continuous winter.

use ndarray::{stack, ArrayD, ArrayView, Axis, IxDyn, Zip};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{HadleyError, Result};
use crate::field::{Field, GriddedSeries};
use crate::logging::{log_reduction_stats, log_timed_operation};

/// Meteorological seasons
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    /// December, January, February
    #[serde(rename = "DJF")]
    Djf,
    /// March, April, May
    #[serde(rename = "MAM")]
    Mam,
    /// June, July, August
    #[serde(rename = "JJA")]
    Jja,
    /// September, October, November
    #[serde(rename = "SON")]
    Son,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Djf, Season::Mam, Season::Jja, Season::Son];

    /// Season containing a month (1 = January)
    pub fn from_month(month: u32) -> Option<Season> {
        match month {
            12 | 1 | 2 => Some(Season::Djf),
            3..=5 => Some(Season::Mam),
            6..=8 => Some(Season::Jja),
            9..=11 => Some(Season::Son),
            _ => None,
        }
    }

    /// Months belonging to this season, in calendar order of the season
    pub fn months(&self) -> [u32; 3] {
        match self {
            Season::Djf => [12, 1, 2],
            Season::Mam => [3, 4, 5],
            Season::Jja => [6, 7, 8],
            Season::Son => [9, 10, 11],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::Djf => "DJF",
            Season::Mam => "MAM",
            Season::Jja => "JJA",
            Season::Son => "SON",
        }
    }

    /// Year a month is counted in; December belongs to the following winter
    pub fn season_year(&self, year: i32, month: u32) -> i32 {
        if *self == Season::Djf && month == 12 {
            year + 1
        } else {
            year
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Season {
    type Err = HadleyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DJF" => Ok(Season::Djf),
            "MAM" => Ok(Season::Mam),
            "JJA" => Ok(Season::Jja),
            "SON" => Ok(Season::Son),
            _ => Err(HadleyError::InvalidParameter {
                param: "season".to_string(),
                message: format!("Unknown season: {}", s),
            }),
        }
    }
}

/// Options shared by the reductions in this module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceOptions {
    /// Copy the source field's attributes onto the result
    pub keep_attrs: bool,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self { keep_attrs: true }
    }
}

/// Time indices of each season present in the series
fn season_groups(series: &GriddedSeries) -> BTreeMap<Season, Vec<usize>> {
    let mut groups: BTreeMap<Season, Vec<usize>> = BTreeMap::new();
    for (i, t) in series.times.iter().enumerate() {
        // Months are validated when the series is built
        if let Some(season) = Season::from_month(t.month) {
            groups.entry(season).or_default().push(i);
        }
    }
    groups
}

/// All-time mean of each season
///
/// Every observation contributes to exactly one season. Seasons without
/// observations are absent from the result.
pub fn season_mean(
    series: &GriddedSeries,
    options: &ReduceOptions,
) -> Result<BTreeMap<Season, Field>> {
    log_timed_operation("season_mean", || {
        let groups = season_groups(series);

        let mut means = BTreeMap::new();
        for (season, indices) in groups {
            debug!(season = %season, members = indices.len(), "Averaging season");
            means.insert(season, series.mean_over(&indices, options.keep_attrs)?);
        }

        log_reduction_stats("season_mean", series.len(), means.len(), series.field.shape());
        Ok(means)
    })
}

/// Per-year mean of each season
///
/// December is counted with the following year's January and February. The
/// first DJF year of the record lacks its December and is dropped, as is the
/// winter begun by the record's final December: DJF years are limited to
/// `min(year) + 1 ..= max(year)` of the source time axis. Other seasons cover
/// every year in which they have observations.
pub fn annual_season_mean(
    series: &GriddedSeries,
    options: &ReduceOptions,
) -> Result<BTreeMap<Season, Vec<(i32, Field)>>> {
    log_timed_operation("annual_season_mean", || {
        let mut result = BTreeMap::new();
        let Some((min_year, max_year)) = series.year_range() else {
            return Ok(result);
        };

        for (season, indices) in season_groups(series) {
            let mut by_year: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
            for i in indices {
                let t = &series.times[i];
                by_year
                    .entry(season.season_year(t.year, t.month))
                    .or_default()
                    .push(i);
            }

            if season == Season::Djf {
                let first = min_year + 1;
                by_year.retain(|&year, _| (first..=max_year).contains(&year));
                debug!(first, last = max_year, "Trimmed DJF years without a full winter");
            }

            let mut entries = Vec::with_capacity(by_year.len());
            for (year, members) in by_year {
                entries.push((year, series.mean_over(&members, options.keep_attrs)?));
            }

            if !entries.is_empty() {
                result.insert(season, entries);
            }
        }

        let groups: usize = result.values().map(Vec::len).sum();
        log_reduction_stats("annual_season_mean", series.len(), groups, series.field.shape());
        Ok(result)
    })
}

/// Stack per-year fields into one array with years along axis 0
pub fn stack_years(entries: &[(i32, Field)]) -> Result<ArrayD<f64>> {
    let Some((_, first)) = entries.first() else {
        return Err(HadleyError::InvalidParameter {
            param: "entries".to_string(),
            message: "Cannot stack an empty list of years".to_string(),
        });
    };
    for (year, field) in entries {
        first.ensure_same_grid(field).map_err(|_| HadleyError::ShapeMismatch {
            message: format!("Year {} has shape {:?}, expected {:?}", year, field.shape(), first.shape()),
        })?;
    }

    let views: Vec<ArrayView<f64, IxDyn>> = entries.iter().map(|(_, f)| f.data.view()).collect();
    Ok(stack(Axis(0), &views)?)
}

/// Area-weighted mean over the latitude and longitude axes
///
/// Weights are `cos(latitude)`; missing cells carry no weight. The result
/// keeps every other dimension of the input.
pub fn latitude_weighted_mean(field: &Field, options: &ReduceOptions) -> Result<Field> {
    let axes = field.spatial_axes()?;
    let lat_axis = field.axis_checked(&axes.lat)?;
    let lon_axis = field.axis_checked(&axes.lon)?;
    let lats = field.coordinate_values(&axes.lat)?;

    // Weights shaped to broadcast along the latitude axis only
    let mut weight_shape = vec![1; field.data.ndim()];
    weight_shape[lat_axis] = lats.len();
    let weights = ArrayD::from_shape_vec(
        IxDyn(&weight_shape),
        lats.iter().map(|lat| lat.to_radians().cos()).collect(),
    )?;
    let weights = weights
        .broadcast(field.data.raw_dim())
        .ok_or_else(|| HadleyError::ShapeMismatch {
            message: format!("Cannot broadcast latitude weights over {:?}", field.shape()),
        })?;

    let weighted = Zip::from(&field.data)
        .and(&weights)
        .map_collect(|&v, &w| if v.is_nan() { 0.0 } else { v * w });
    let valid = Zip::from(&field.data)
        .and(&weights)
        .map_collect(|&v, &w| if v.is_nan() { 0.0 } else { w });

    // Remove the higher axis first so the lower index stays valid
    let (first, second) = if lat_axis > lon_axis {
        (lat_axis, lon_axis)
    } else {
        (lon_axis, lat_axis)
    };
    let numerator = weighted.sum_axis(Axis(first)).sum_axis(Axis(second));
    let denominator = valid.sum_axis(Axis(first)).sum_axis(Axis(second));

    let mut empty_cells = 0usize;
    let mean = Zip::from(&numerator).and(&denominator).map_collect(|&n, &d| {
        if d == 0.0 {
            empty_cells += 1;
            f64::NAN
        } else {
            n / d
        }
    });
    if empty_cells > 0 {
        warn!(
            field = %field.name,
            empty_cells,
            "Weighted mean had no valid cells; result set to NaN"
        );
    }

    field.derive(field.name.clone(), &[lat_axis, lon_axis], mean, options.keep_attrs)
}
