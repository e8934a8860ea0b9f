//! Gridded data model for hadley.
//!
//! A [`Field`] is an n-dimensional array with named dimensions and
//! coordinate metadata; a [`GriddedSeries`] is a field whose leading axis is
//! time. Missing values are stored as NaN.

use ndarray::{ArrayD, Axis, IxDyn, Zip};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::error::{HadleyError, Result};
use crate::time::{decode_cf_times, Calendar, CalendarDate};

/// Latitude names recognized when no coordinate attribute identifies the axis
const LATITUDE_NAMES: &[&str] = &["lat", "latitude", "lats", "nav_lat", "xlat", "y"];

/// Longitude names recognized when no coordinate attribute identifies the axis
const LONGITUDE_NAMES: &[&str] = &["lon", "longitude", "lons", "long", "nav_lon", "xlong", "x"];

const NORTH_UNITS: &[&str] = &["degrees_north", "degree_north", "degree_n", "degrees_n", "degreen", "degreesn"];
const EAST_UNITS: &[&str] = &["degrees_east", "degree_east", "degree_e", "degrees_e", "degreee", "degreese"];

/// Possible attribute values on fields and coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String attribute
    Text(String),
    /// Numeric attribute (stored as f64 for simplicity)
    Number(f64),
    /// Array of numbers
    NumberArray(Vec<f64>),
}

impl AttributeValue {
    /// The text value, if this is a text attribute
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

/// Coordinate values along one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Name of the dimension this coordinate labels
    pub name: String,
    /// One value per index along the dimension
    pub values: Vec<f64>,
    /// Coordinate attributes (units, standard_name, axis, ...)
    pub attributes: HashMap<String, AttributeValue>,
}

impl Coordinate {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    fn text_attribute(&self, key: &str) -> Option<String> {
        self.attributes
            .get(key)
            .and_then(AttributeValue::as_text)
            .map(|s| s.trim().to_lowercase())
    }
}

/// Which kind of horizontal axis a dimension represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisKind {
    Latitude,
    Longitude,
}

/// Names of the discovered horizontal axes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialAxes {
    pub lat: String,
    pub lon: String,
}

/// An n-dimensional field with named dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Name of the field
    pub name: String,
    /// Dimension names, one per array axis
    pub dims: Vec<String>,
    /// Field values; NaN marks missing data
    pub data: ArrayD<f64>,
    /// Coordinates keyed by dimension name
    pub coords: HashMap<String, Coordinate>,
    /// Field attributes
    pub attributes: HashMap<String, AttributeValue>,
}

impl Field {
    /// Create a field, checking that every axis has a distinct name
    pub fn new(name: impl Into<String>, dims: Vec<String>, data: ArrayD<f64>) -> Result<Self> {
        let field = Self {
            name: name.into(),
            dims,
            data,
            coords: HashMap::new(),
            attributes: HashMap::new(),
        };
        field.validate()?;
        Ok(field)
    }

    /// Create a field from a flat vector in row-major order
    pub fn from_shape_vec(
        name: impl Into<String>,
        dims: &[&str],
        shape: &[usize],
        values: Vec<f64>,
    ) -> Result<Self> {
        let data = ArrayD::from_shape_vec(IxDyn(shape), values)?;
        Self::new(name, dims.iter().map(|d| d.to_string()).collect(), data)
    }

    /// Attach a coordinate to one of the field's dimensions
    pub fn with_coordinate(mut self, coord: Coordinate) -> Result<Self> {
        let axis = self.axis_checked(&coord.name)?;
        let len = self.data.len_of(Axis(axis));
        if coord.values.len() != len {
            return Err(HadleyError::ShapeMismatch {
                message: format!(
                    "Coordinate {} has {} values but dimension has length {}",
                    coord.name,
                    coord.values.len(),
                    len
                ),
            });
        }
        self.coords.insert(coord.name.clone(), coord);
        Ok(self)
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Shape of the underlying array
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Position of a named dimension
    pub fn axis_index(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Position of a named dimension with error handling
    pub fn axis_checked(&self, dim: &str) -> Result<usize> {
        self.axis_index(dim).ok_or_else(|| HadleyError::AxisNotFound {
            message: format!("Field {} has no dimension {}", self.name, dim),
        })
    }

    /// Get coordinate metadata for a dimension
    pub fn coordinate(&self, dim: &str) -> Option<&Coordinate> {
        self.coords.get(dim)
    }

    /// Get coordinate values for a dimension with error handling
    pub fn coordinate_values(&self, dim: &str) -> Result<&[f64]> {
        self.coords
            .get(dim)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| HadleyError::AxisNotFound {
                message: format!("Field {} has no coordinate values for {}", self.name, dim),
            })
    }

    /// Text attribute lookup
    pub fn attribute_text(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(AttributeValue::as_text)
    }

    /// Validate that dimension names and coordinates agree with the data
    pub fn validate(&self) -> Result<()> {
        if self.dims.len() != self.data.ndim() {
            return Err(HadleyError::ShapeMismatch {
                message: format!(
                    "Field {} has {} dimension names for a {}-dimensional array",
                    self.name,
                    self.dims.len(),
                    self.data.ndim()
                ),
            });
        }

        for (i, dim) in self.dims.iter().enumerate() {
            if self.dims[..i].contains(dim) {
                return Err(HadleyError::InvalidParameter {
                    param: "dims".to_string(),
                    message: format!("Duplicate dimension {} in field {}", dim, self.name),
                });
            }
        }

        for (dim, coord) in &self.coords {
            let axis = self.axis_checked(dim)?;
            if coord.values.len() != self.data.len_of(Axis(axis)) {
                return Err(HadleyError::ShapeMismatch {
                    message: format!(
                        "Coordinate {} has inconsistent length: expected {}, got {}",
                        dim,
                        self.data.len_of(Axis(axis)),
                        coord.values.len()
                    ),
                });
            }
        }

        Ok(())
    }

    /// Fail unless `other` has the same dimensions and shape
    pub fn ensure_same_grid(&self, other: &Field) -> Result<()> {
        if self.dims != other.dims || self.shape() != other.shape() {
            return Err(HadleyError::ShapeMismatch {
                message: format!(
                    "Field {} {:?} {:?} does not match field {} {:?} {:?}",
                    self.name,
                    self.dims,
                    self.shape(),
                    other.name,
                    other.dims,
                    other.shape()
                ),
            });
        }
        Ok(())
    }

    /// Classify a dimension as latitude or longitude from its metadata
    fn classify_by_attributes(&self, dim: &str) -> Option<AxisKind> {
        let coord = self.coords.get(dim)?;

        match coord.text_attribute("standard_name").as_deref() {
            Some("latitude") | Some("grid_latitude") => return Some(AxisKind::Latitude),
            Some("longitude") | Some("grid_longitude") => return Some(AxisKind::Longitude),
            _ => {}
        }

        match coord.text_attribute("axis").as_deref() {
            Some("y") => return Some(AxisKind::Latitude),
            Some("x") => return Some(AxisKind::Longitude),
            _ => {}
        }

        let units = coord.text_attribute("units")?;
        if NORTH_UNITS.contains(&units.as_str()) {
            Some(AxisKind::Latitude)
        } else if EAST_UNITS.contains(&units.as_str()) {
            Some(AxisKind::Longitude)
        } else {
            None
        }
    }

    fn classify_by_name(dim: &str) -> Option<AxisKind> {
        let lower = dim.to_lowercase();
        if LATITUDE_NAMES.contains(&lower.as_str()) {
            Some(AxisKind::Latitude)
        } else if LONGITUDE_NAMES.contains(&lower.as_str()) {
            Some(AxisKind::Longitude)
        } else {
            None
        }
    }

    fn find_axis(&self, kind: AxisKind) -> Option<String> {
        self.dims
            .iter()
            .find(|d| self.classify_by_attributes(d) == Some(kind))
            .or_else(|| {
                self.dims
                    .iter()
                    .find(|d| Self::classify_by_name(d) == Some(kind))
            })
            .cloned()
    }

    /// Discover the latitude and longitude dimensions
    ///
    /// Coordinate attributes (`standard_name`, `axis`, `units`) take
    /// precedence over dimension names.
    pub fn spatial_axes(&self) -> Result<SpatialAxes> {
        let lat = self.find_axis(AxisKind::Latitude).ok_or_else(|| HadleyError::AxisNotFound {
            message: format!("No latitude axis found among {:?}", self.dims),
        })?;
        let lon = self.find_axis(AxisKind::Longitude).ok_or_else(|| HadleyError::AxisNotFound {
            message: format!("No longitude axis found among {:?}", self.dims),
        })?;
        Ok(SpatialAxes { lat, lon })
    }

    /// Build a field on this field's grid minus `removed` axes
    pub(crate) fn derive(
        &self,
        name: impl Into<String>,
        removed: &[usize],
        data: ArrayD<f64>,
        keep_attrs: bool,
    ) -> Result<Field> {
        let dims: Vec<String> = self
            .dims
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, d)| d.clone())
            .collect();

        let coords = dims
            .iter()
            .filter_map(|d| self.coords.get(d).map(|c| (d.clone(), c.clone())))
            .collect();

        let attributes = if keep_attrs {
            self.attributes.clone()
        } else {
            HashMap::new()
        };

        let field = Field {
            name: name.into(),
            dims,
            data,
            coords,
            attributes,
        };
        field.validate()?;
        Ok(field)
    }
}

/// A field whose leading axis is time
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedSeries {
    /// Field values with time as axis 0
    pub field: Field,
    /// One timestamp per index along axis 0
    pub times: Vec<CalendarDate>,
    /// Calendar the timestamps are expressed in
    pub calendar: Calendar,
}

impl GriddedSeries {
    /// Pair a field with explicit timestamps
    pub fn new(field: Field, times: Vec<CalendarDate>, calendar: Calendar) -> Result<Self> {
        if field.data.ndim() == 0 {
            return Err(HadleyError::AxisNotFound {
                message: format!("Field {} has no time axis", field.name),
            });
        }
        let len = field.data.len_of(Axis(0));
        if times.len() != len {
            return Err(HadleyError::ShapeMismatch {
                message: format!(
                    "{} timestamps for a time axis of length {}",
                    times.len(),
                    len
                ),
            });
        }
        for t in &times {
            t.validate(calendar)?;
        }
        Ok(Self {
            field,
            times,
            calendar,
        })
    }

    /// Decode timestamps from the CF `units` and `calendar` attributes of the
    /// leading coordinate
    pub fn from_cf_coordinate(field: Field) -> Result<Self> {
        let time_dim = field.dims.first().cloned().ok_or_else(|| HadleyError::AxisNotFound {
            message: format!("Field {} has no time axis", field.name),
        })?;
        let coord = field.coordinate(&time_dim).ok_or_else(|| HadleyError::AxisNotFound {
            message: format!("No coordinate values for time dimension {}", time_dim),
        })?;

        let units = coord
            .attributes
            .get("units")
            .and_then(AttributeValue::as_text)
            .ok_or_else(|| HadleyError::InvalidTime {
                message: format!("Time coordinate {} has no units attribute", time_dim),
            })?;
        let calendar = match coord.attributes.get("calendar").and_then(AttributeValue::as_text) {
            Some(name) => name.parse()?,
            None => Calendar::Standard,
        };

        let times = decode_cf_times(units, &coord.values, calendar)?;
        Self::new(field, times, calendar)
    }

    /// Name of the time dimension
    pub fn time_dim(&self) -> &str {
        &self.field.dims[0]
    }

    /// Number of time steps
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Earliest and latest calendar year on the time axis
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.times.iter().map(|t| t.year).min()?;
        let max = self.times.iter().map(|t| t.year).max()?;
        Some((min, max))
    }

    /// NaN-skipping mean over the given time steps
    pub(crate) fn mean_over(&self, indices: &[usize], keep_attrs: bool) -> Result<Field> {
        let subset = self.field.data.select(Axis(0), indices);
        let (data, empty_cells) = nanmean_axis0(&subset);
        if empty_cells > 0 {
            warn!(
                field = %self.field.name,
                steps = indices.len(),
                empty_cells,
                "Time mean had no valid values in some cells; set to NaN"
            );
        }
        self.field
            .derive(self.field.name.clone(), &[0], data, keep_attrs)
    }
}

/// Mean along axis 0 ignoring NaN, with the number of cells that had no
/// valid values (those become NaN)
pub(crate) fn nanmean_axis0(data: &ArrayD<f64>) -> (ArrayD<f64>, usize) {
    let shape = IxDyn(&data.shape()[1..]);
    let mut sum = ArrayD::<f64>::zeros(shape.clone());
    let mut count = ArrayD::<f64>::zeros(shape);

    for lane in data.axis_iter(Axis(0)) {
        Zip::from(&mut sum)
            .and(&mut count)
            .and(&lane)
            .for_each(|s, c, &v| {
                if !v.is_nan() {
                    *s += v;
                    *c += 1.0;
                }
            });
    }

    let mut empty_cells = 0usize;
    let mean = Zip::from(&sum).and(&count).map_collect(|&s, &c| {
        if c > 0.0 {
            s / c
        } else {
            empty_cells += 1;
            f64::NAN
        }
    });
    (mean, empty_cells)
}
