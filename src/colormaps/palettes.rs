//! Anchor tables for palettes not shipped by `colorgrad`.
//!
//! Each table is a list of opaque RGB anchors, evenly spaced over `[0, 1]`
//! and linearly interpolated by [`Ramp::from_rgb8`](super::Ramp::from_rgb8).
//! The oceanographic tables approximate the cmocean palettes of the same
//! name closely enough for contour plots; they are not byte-exact copies.

/// Coolwarm: blue to red through light gray
pub const COOLWARM: &[[u8; 3]] = &[
    [59, 76, 192], // Dark blue
    [77, 104, 215],
    [98, 130, 234],
    [119, 154, 247],
    [141, 176, 254],
    [163, 194, 255],
    [184, 208, 249],
    [204, 217, 238],
    [221, 221, 221], // Gray in the middle
    [236, 211, 197],
    [245, 196, 173],
    [247, 177, 148],
    [244, 154, 123],
    [236, 127, 99],
    [222, 96, 77],
    [203, 62, 56],
    [180, 4, 38], // Dark red
];

/// Seismic: dark blue to white to dark red
pub const SEISMIC: &[[u8; 3]] = &[
    [0, 0, 127], // Dark blue
    [0, 0, 191],
    [0, 63, 255],
    [0, 127, 255],
    [0, 191, 255],
    [127, 223, 255],
    [191, 239, 255],
    [255, 255, 255], // White in the middle
    [255, 239, 191],
    [255, 223, 127],
    [255, 191, 0],
    [255, 127, 0],
    [255, 63, 0],
    [191, 0, 0],
    [127, 0, 0], // Dark red
];

/// Bone: black through blue-gray to white
pub const BONE: &[[u8; 3]] = &[
    [0, 0, 0],
    [42, 42, 58],
    [84, 84, 116],
    [116, 126, 158],
    [148, 168, 180],
    [190, 210, 210],
    [255, 255, 255],
];

/// Afmhot: black through red and orange to white
pub const AFMHOT: &[[u8; 3]] = &[
    [0, 0, 0],
    [128, 0, 0],
    [255, 128, 0],
    [255, 255, 128],
    [255, 255, 255],
];

/// Twilight, shifted so the dark end sits at both extremes
pub const TWILIGHT_SHIFTED: &[[u8; 3]] = &[
    [48, 20, 55],
    [63, 60, 150],
    [94, 128, 185],
    [170, 190, 210],
    [226, 217, 226],
    [200, 150, 130],
    [170, 85, 70],
    [110, 30, 70],
    [48, 20, 55],
];

/// Gray: black to white
pub const GRAY: &[[u8; 3]] = &[[0, 0, 0], [255, 255, 255]];

pub const MATTER: &[[u8; 3]] = &[
    [254, 237, 176],
    [246, 189, 131],
    [236, 140, 95],
    [219, 92, 80],
    [182, 51, 84],
    [133, 29, 86],
    [85, 22, 72],
    [47, 15, 61],
];

pub const TEMPO: &[[u8; 3]] = &[
    [255, 246, 244],
    [204, 224, 200],
    [150, 200, 160],
    [90, 172, 130],
    [36, 140, 110],
    [20, 100, 90],
    [20, 60, 60],
    [21, 29, 68],
];

/// Delta: dark blue to pale yellow to dark green
pub const DELTA: &[[u8; 3]] = &[
    [17, 32, 64],
    [29, 72, 140],
    [40, 130, 170],
    [140, 200, 195],
    [255, 253, 205],
    [180, 200, 100],
    [90, 160, 40],
    [30, 100, 30],
    [23, 35, 19],
];

/// Curl: dark teal to white to dark magenta
pub const CURL: &[[u8; 3]] = &[
    [21, 29, 68],
    [27, 90, 105],
    [80, 150, 140],
    [190, 220, 210],
    [254, 246, 245],
    [230, 170, 160],
    [200, 100, 110],
    [140, 40, 90],
    [52, 13, 53],
];

pub const AMP: &[[u8; 3]] = &[
    [241, 237, 236],
    [230, 190, 175],
    [220, 140, 120],
    [205, 90, 75],
    [180, 45, 45],
    [130, 20, 40],
    [60, 9, 18],
];

pub const ICE: &[[u8; 3]] = &[
    [4, 6, 19],
    [40, 40, 80],
    [60, 80, 140],
    [70, 120, 170],
    [100, 165, 195],
    [160, 210, 220],
    [234, 253, 253],
];

/// Diff: dark blue to white to dark brown
pub const DIFF: &[[u8; 3]] = &[
    [8, 36, 95],
    [50, 100, 160],
    [150, 180, 210],
    [245, 245, 245],
    [210, 180, 140],
    [160, 120, 70],
    [80, 60, 20],
];

pub const THERMAL: &[[u8; 3]] = &[
    [4, 35, 51],
    [40, 50, 130],
    [100, 60, 150],
    [160, 70, 130],
    [215, 90, 95],
    [245, 130, 60],
    [250, 190, 50],
    [232, 250, 91],
];

/// Topo: ocean blues on the lower half, land greens and browns above
pub const TOPO: &[[u8; 3]] = &[
    [40, 26, 44],
    [60, 60, 120],
    [65, 110, 170],
    [120, 170, 200],
    [190, 230, 230],
    [10, 60, 30],
    [60, 110, 40],
    [140, 150, 80],
    [190, 170, 120],
    [240, 240, 220],
];

pub const DEEP: &[[u8; 3]] = &[
    [253, 254, 204],
    [170, 220, 170],
    [100, 185, 160],
    [70, 140, 150],
    [60, 95, 140],
    [60, 55, 115],
    [40, 26, 44],
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormaps::{Colormap, Ramp};

    #[test]
    fn test_tables_build() {
        for (name, table) in [
            ("coolwarm", COOLWARM),
            ("seismic", SEISMIC),
            ("delta", DELTA),
            ("topo", TOPO),
        ] {
            let ramp = Ramp::from_rgb8(name, table).unwrap();
            assert_eq!(ramp.len(), table.len());
        }
    }

    #[test]
    fn test_coolwarm_bounds() {
        let ramp = Ramp::from_rgb8("coolwarm", COOLWARM).unwrap();

        let blue = ramp.sample(0.0);
        let red = ramp.sample(1.0);
        assert!(blue[2] > blue[0]);
        assert!(red[0] > red[2]);

        let middle = ramp.sample(0.5);
        assert!(middle.iter().take(3).all(|&c| c > 0.8));
    }

    #[test]
    fn test_diverging_tables_are_symmetric_in_length() {
        // Odd anchor counts put a single anchor exactly at the center
        assert_eq!(SEISMIC.len() % 2, 1);
        assert_eq!(CURL.len() % 2, 1);
        assert_eq!(DELTA.len() % 2, 1);
    }
}
