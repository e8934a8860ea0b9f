//! Test data generation utilities.
//!
//! This module builds in-memory fields and monthly series with known data
//! patterns on small latitude/longitude grids.

use hadley::field::{Coordinate, Field, GriddedSeries};
use hadley::time::{Calendar, CalendarDate};

/// `n` latitudes evenly spaced from `-span` to `span` degrees
pub fn latitudes(n: usize, span: f64) -> Vec<f64> {
    if n == 1 {
        return vec![0.0];
    }
    (0..n)
        .map(|i| -span + 2.0 * span * i as f64 / (n - 1) as f64)
        .collect()
}

/// `n` longitudes evenly spaced around the globe starting at 0
pub fn longitudes(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 * 360.0 / n as f64).collect()
}

fn lat_coord(lats: &[f64]) -> Coordinate {
    Coordinate::new("lat", lats.to_vec())
        .with_attribute("units", "degrees_north")
        .with_attribute("standard_name", "latitude")
}

fn lon_coord(lons: &[f64]) -> Coordinate {
    Coordinate::new("lon", lons.to_vec())
        .with_attribute("units", "degrees_east")
        .with_attribute("standard_name", "longitude")
}

/// A `[lat, lon]` field with values `f(lat, lon)`
pub fn grid_field<F>(name: &str, lats: &[f64], lons: &[f64], f: F) -> Field
where
    F: Fn(f64, f64) -> f64,
{
    let mut values = Vec::with_capacity(lats.len() * lons.len());
    for &lat in lats {
        for &lon in lons {
            values.push(f(lat, lon));
        }
    }

    Field::from_shape_vec(name, &["lat", "lon"], &[lats.len(), lons.len()], values)
        .unwrap()
        .with_coordinate(lat_coord(lats))
        .unwrap()
        .with_coordinate(lon_coord(lons))
        .unwrap()
        .with_attribute("units", "K")
}

fn monthly_values<F>(start_year: i32, months: usize, lats: &[f64], lons: &[f64], f: &F) -> (Vec<f64>, Vec<CalendarDate>)
where
    F: Fn(usize, CalendarDate, f64, f64) -> f64,
{
    let mut values = Vec::with_capacity(months * lats.len() * lons.len());
    let mut times = Vec::with_capacity(months);
    for t in 0..months {
        let date = CalendarDate::ymd(start_year + (t / 12) as i32, (t % 12) as u32 + 1, 15);
        for &lat in lats {
            for &lon in lons {
                values.push(f(t, date, lat, lon));
            }
        }
        times.push(date);
    }
    (values, times)
}

fn time_lat_lon_field(name: &str, months: usize, lats: &[f64], lons: &[f64], values: Vec<f64>) -> Field {
    Field::from_shape_vec(
        name,
        &["time", "lat", "lon"],
        &[months, lats.len(), lons.len()],
        values,
    )
    .unwrap()
    .with_coordinate(lat_coord(lats))
    .unwrap()
    .with_coordinate(lon_coord(lons))
    .unwrap()
    .with_attribute("units", "K")
    .with_attribute("long_name", "surface temperature")
}

/// A `[time, lat, lon]` series of mid-month values starting in January of
/// `start_year`
///
/// `f` receives the time index, the timestamp, latitude and longitude.
pub fn monthly_series<F>(
    name: &str,
    start_year: i32,
    months: usize,
    lats: &[f64],
    lons: &[f64],
    f: F,
) -> GriddedSeries
where
    F: Fn(usize, CalendarDate, f64, f64) -> f64,
{
    let (values, times) = monthly_values(start_year, months, lats, lons, &f);
    let field = time_lat_lon_field(name, months, lats, lons, values);
    GriddedSeries::new(field, times, Calendar::NoLeap).unwrap()
}

/// Same as [`monthly_series`] but with the time axis stored as a CF
/// `days since` coordinate on a `noleap` calendar
pub fn cf_monthly_series<F>(
    name: &str,
    start_year: i32,
    months: usize,
    lats: &[f64],
    lons: &[f64],
    f: F,
) -> GriddedSeries
where
    F: Fn(usize, CalendarDate, f64, f64) -> f64,
{
    let (values, times) = monthly_values(start_year, months, lats, lons, &f);

    let mut offsets = Vec::with_capacity(months);
    let mut elapsed = 0u32;
    for date in &times {
        offsets.push((elapsed + 14) as f64);
        elapsed += Calendar::NoLeap.days_in_month(date.year, date.month);
    }
    let time = Coordinate::new("time", offsets)
        .with_attribute("units", format!("days since {}-01-01 00:00:00", start_year).as_str())
        .with_attribute("calendar", "noleap");

    let field = time_lat_lon_field(name, months, lats, lons, values)
        .with_coordinate(time)
        .unwrap();
    GriddedSeries::from_cf_coordinate(field).unwrap()
}
