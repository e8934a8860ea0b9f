//! # hadley
//!
//! Post-processing helpers for gridded climate model output.
//!
//! This library provides the building blocks used when turning raw model
//! fields into seasonal climatologies, significance maps and plots.
//!
//! ## Key Features
//!
//! - **Colormaps**: named palettes plus clipping and stacking of ramps,
//!   including diverging ramps with a neutral white band
//! - **Seasonal climatology**: DJF/MAM/JJA/SON means, all-time or per year,
//!   with December counted toward the following winter
//! - **Significance testing**: cell-wise paired and Welch t-tests with masking
//!   of non-significant differences
//! - **Field settings**: plot bounds, levels and colormaps for common fields
//! - **Dynamics**: wind speed, Froude number and horizontal convergence
//!
//! ## Architecture
//!
//! - **Data Layer**: in-memory [`Field`] and [`GriddedSeries`] values with
//!   named dimensions and CF calendar support
//! - **Processing**: pure functions over those values; nothing here reads
//!   model output files
//! - **Ambient**: layered [`Config`], `tracing` based logging and a single
//!   error type

pub mod climatology;
pub mod colormaps;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod field;
pub mod logging;
pub mod settings;
pub mod stats;
pub mod time;

pub use climatology::{
    annual_season_mean, latitude_weighted_mean, season_mean, stack_years, ReduceOptions, Season,
};
pub use colormaps::{clip, combine, combine_with_center, get_colormap, Colormap, Ramp};
pub use config::Config;
pub use dynamics::{convergence, froude, froude_number, wind_speed};
pub use error::{HadleyError, Result};
pub use field::{AttributeValue, Coordinate, Field, GriddedSeries};
pub use logging::{
    generate_operation_id, init_tracing, log_error, log_operation_end, log_operation_start,
    log_reduction_stats, log_timed_operation,
};
pub use settings::{field_settings, BoundaryNorm, ColorScale, FieldKind, FieldSettings};
pub use stats::{independent_test, paired_test, MaskedArray, SignificanceResult};
pub use time::{decode_cf_times, Calendar, CalendarDate};
