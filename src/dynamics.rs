//! Derived dynamical quantities: wind speed, Froude number and horizontal
//! convergence on a regular latitude/longitude grid.

use ndarray::{ArrayD, Axis, IxDyn, Zip};
use tracing::warn;

use crate::error::{HadleyError, Result};
use crate::field::{AttributeValue, Field};

/// Mean Earth radius in meters
pub const EARTH_RADIUS: f64 = 6_371_229.0;

fn copy_units(target: Field, source: &Field) -> Field {
    match source.attributes.get("units") {
        Some(units) => target.with_attribute("units", units.clone()),
        None => target,
    }
}

/// Horizontal wind speed `sqrt(u^2 + v^2)`
pub fn wind_speed(u: &Field, v: &Field) -> Result<Field> {
    u.ensure_same_grid(v)?;
    let speed = Zip::from(&u.data)
        .and(&v.data)
        .map_collect(|&a, &b| a.hypot(b));
    let field = u
        .derive("wind_speed", &[], speed, false)?
        .with_attribute("long_name", "wind speed");
    Ok(copy_units(field, u))
}

/// Froude number `N * h / U`; zero speed yields NaN
pub fn froude_number(n: f64, h: f64, speed: f64) -> f64 {
    if speed == 0.0 {
        f64::NAN
    } else {
        n * h / speed
    }
}

/// Elementwise [`froude_number`] over matching fields
pub fn froude(n: &Field, h: &Field, speed: &Field) -> Result<Field> {
    n.ensure_same_grid(h)?;
    n.ensure_same_grid(speed)?;

    let mut calm = 0usize;
    let fr = Zip::from(&n.data)
        .and(&h.data)
        .and(&speed.data)
        .map_collect(|&n, &h, &u| {
            if u == 0.0 {
                calm += 1;
            }
            froude_number(n, h, u)
        });
    if calm > 0 {
        warn!(cells = calm, "Zero wind speed in Froude number; set to NaN");
    }

    Ok(n.derive("froude", &[], fr, false)?
        .with_attribute("long_name", "Froude number")
        .with_attribute("units", AttributeValue::Text("1".to_string())))
}

/// First derivative along `axis` with respect to `coords`
///
/// Second-order centered differences in the interior and first-order
/// one-sided differences at both ends; spacing need not be uniform.
pub fn gradient(data: &ArrayD<f64>, axis: usize, coords: &[f64]) -> Result<ArrayD<f64>> {
    let n = data.len_of(Axis(axis));
    if n < 2 {
        return Err(HadleyError::InvalidParameter {
            param: "axis".to_string(),
            message: format!("Need at least 2 points along axis {} to differentiate, got {}", axis, n),
        });
    }
    if coords.len() != n {
        return Err(HadleyError::ShapeMismatch {
            message: format!("{} coordinates for an axis of length {}", coords.len(), n),
        });
    }
    if coords.windows(2).any(|w| w[1] == w[0]) {
        return Err(HadleyError::InvalidParameter {
            param: "coords".to_string(),
            message: "Coordinate spacing must be non-zero".to_string(),
        });
    }

    let x = coords;
    let mut out = ArrayD::<f64>::zeros(data.raw_dim());
    Zip::from(out.lanes_mut(Axis(axis)))
        .and(data.lanes(Axis(axis)))
        .for_each(|mut d, f| {
            d[0] = (f[1] - f[0]) / (x[1] - x[0]);
            d[n - 1] = (f[n - 1] - f[n - 2]) / (x[n - 1] - x[n - 2]);
            for i in 1..n - 1 {
                let hs = x[i] - x[i - 1];
                let hd = x[i + 1] - x[i];
                d[i] = (hs * hs * f[i + 1] + (hd * hd - hs * hs) * f[i] - hd * hd * f[i - 1])
                    / (hs * hd * (hd + hs));
            }
        });
    Ok(out)
}

/// Horizontal convergence `-(du/dx + dv/dy)` of a wind field
///
/// Latitude and longitude are discovered from the field metadata and must
/// carry coordinate values in degrees. At the poles `du/dx` is undefined and
/// the result is NaN.
pub fn convergence(u: &Field, v: &Field) -> Result<Field> {
    u.ensure_same_grid(v)?;
    let axes = u.spatial_axes()?;
    let lat_axis = u.axis_checked(&axes.lat)?;
    let lon_axis = u.axis_checked(&axes.lon)?;

    let lat_rad: Vec<f64> = u.coordinate_values(&axes.lat)?.iter().map(|d| d.to_radians()).collect();
    let lon_rad: Vec<f64> = u.coordinate_values(&axes.lon)?.iter().map(|d| d.to_radians()).collect();

    let du_dlon = gradient(&u.data, lon_axis, &lon_rad)?;
    let dv_dlat = gradient(&v.data, lat_axis, &lat_rad)?;

    // 1 / (R cos(lat)), broadcast along the latitude axis
    let mut scale_shape = vec![1; u.data.ndim()];
    scale_shape[lat_axis] = lat_rad.len();
    let inv_dx = ArrayD::from_shape_vec(
        IxDyn(&scale_shape),
        lat_rad
            .iter()
            .map(|phi| {
                let cos = phi.cos();
                if cos.abs() < 1e-12 {
                    f64::NAN
                } else {
                    1.0 / (EARTH_RADIUS * cos)
                }
            })
            .collect(),
    )?;
    let inv_dx = inv_dx
        .broadcast(u.data.raw_dim())
        .ok_or_else(|| HadleyError::ShapeMismatch {
            message: format!("Cannot broadcast grid spacing over {:?}", u.shape()),
        })?;

    let cvg = Zip::from(&du_dlon)
        .and(&dv_dlat)
        .and(&inv_dx)
        .map_collect(|&dudl, &dvdp, &k| -(dudl * k + dvdp / EARTH_RADIUS));

    Ok(u.derive("convergence", &[], cvg, false)?
        .with_attribute("long_name", "horizontal convergence")
        .with_attribute("units", "s-1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Coordinate;

    fn grid(name: &str, values: Vec<f64>) -> Field {
        Field::from_shape_vec(name, &["lat", "lon"], &[3, 4], values)
            .unwrap()
            .with_coordinate(Coordinate::new("lat", vec![-10.0, 0.0, 10.0]))
            .unwrap()
            .with_coordinate(Coordinate::new("lon", vec![0.0, 10.0, 20.0, 30.0]))
            .unwrap()
            .with_attribute("units", "m s-1")
    }

    #[test]
    fn test_wind_speed() {
        let u = grid("u", vec![3.0; 12]);
        let v = grid("v", vec![-4.0; 12]);
        let speed = wind_speed(&u, &v).unwrap();
        assert!(speed.data.iter().all(|&s| s == 5.0));
        assert_eq!(speed.name, "wind_speed");
        assert_eq!(speed.attribute_text("units"), Some("m s-1"));
        assert!(speed.coordinate("lat").is_some());
    }

    #[test]
    fn test_wind_speed_shape_mismatch() {
        let u = grid("u", vec![3.0; 12]);
        let v = Field::from_shape_vec("v", &["lat", "lon"], &[4, 3], vec![0.0; 12]).unwrap();
        assert!(matches!(wind_speed(&u, &v), Err(HadleyError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_froude_number() {
        assert_eq!(froude_number(0.01, 1000.0, 5.0), 2.0);
        assert!(froude_number(0.01, 1000.0, 0.0).is_nan());

        let n = grid("n", vec![0.01; 12]);
        let h = grid("h", vec![500.0; 12]);
        let mut speeds = vec![10.0; 12];
        speeds[3] = 0.0;
        let u = grid("u", speeds);

        let fr = froude(&n, &h, &u).unwrap();
        assert!((fr.data[[0, 0]] - 0.5).abs() < 1e-12);
        assert!(fr.data[[0, 3]].is_nan());
    }

    #[test]
    fn test_gradient_matches_numpy_style() {
        let data = ArrayD::from_shape_vec(IxDyn(&[5]), vec![1.0, 2.0, 4.0, 7.0, 11.0]).unwrap();
        let g = gradient(&data, 0, &[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        let expected = [1.0, 1.5, 2.5, 3.5, 4.0];
        for (a, e) in g.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12);
        }

        // Non-uniform spacing is exact for quadratics in the interior
        let x = [0.0, 1.0, 3.0];
        let data = ArrayD::from_shape_vec(IxDyn(&[3]), x.iter().map(|v| v * v).collect()).unwrap();
        let g = gradient(&data, 0, &x).unwrap();
        assert!((g[[1]] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_rejects_short_axis() {
        let data = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![1.0, 2.0, 3.0]).unwrap();
        assert!(gradient(&data, 0, &[0.0]).is_err());
        assert!(gradient(&data, 1, &[0.0, 1.0]).is_err());
        assert!(gradient(&data, 1, &[0.0, 0.0, 1.0]).is_err());
    }

    #[test]
    fn test_convergence_of_uniform_wind_is_zero() {
        let u = grid("u", vec![5.0; 12]);
        let v = grid("v", vec![-2.0; 12]);
        let cvg = convergence(&u, &v).unwrap();
        assert!(cvg.data.iter().all(|&c| c.abs() < 1e-18));
    }

    #[test]
    fn test_convergence_of_diverging_wind() {
        // u grows eastward: divergent flow, negative convergence
        let values: Vec<f64> = (0..12).map(|i| (i % 4) as f64).collect();
        let u = grid("u", values);
        let v = grid("v", vec![0.0; 12]);
        let cvg = convergence(&u, &v).unwrap();

        let dlon = 10f64.to_radians();
        let expected_equator = -1.0 / (EARTH_RADIUS * dlon);
        assert!((cvg.data[[1, 1]] - expected_equator).abs() < 1e-15);
        assert!(cvg.data.iter().all(|&c| c < 0.0));
    }
}
