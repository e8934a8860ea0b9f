//! Colormap construction for climate-field plots.
//!
//! This module provides named palettes, a discrete [`Ramp`] type and the
//! operations that derive new ramps by clipping and stacking existing ones.

pub mod builder;
pub mod colormap;
pub mod palettes;

pub use builder::{
    clip, clip_with_samples, combine, combine_with_center, linspace, CombineOptions,
    DEFAULT_SAMPLES,
};
pub use colormap::{
    get_colormap, lerp_color, to_rgba8, Colormap, Ramp, RampMode, Rgba, TRANSPARENT,
    WHITE,
};
