//! Ranking of the stabilized palette and selection of the dominant color.

use crate::{Color, PaletteResult};

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use palette::{IntoColor, Srgb, Xyz};

/// The relative luminance of a color, in `[0, 1]`.
///
/// This is the `Y` component of CIE XYZ computed from the linearized sRGB components.
///
/// # Examples
/// ```
/// # use chromapick::rank::relative_luminance;
/// # use palette::Srgb;
/// assert!(relative_luminance(Srgb::new(0, 0, 0)) < 1e-6);
/// assert!((relative_luminance(Srgb::new(255, 255, 255)) - 1.0).abs() < 1e-3);
/// ```
#[must_use]
pub fn relative_luminance(color: Srgb<u8>) -> f32 {
    let xyz: Xyz = color.into_format::<f32>().into_color();
    xyz.y
}

/// Sorts colors by descending ratio, breaking ties by descending luminance.
///
/// A missing ratio ranks as `0`.
/// The sort is stable, so colors with equal ratio and luminance keep their input order.
#[must_use]
pub fn rank(mut colors: Vec<Color>) -> Vec<Color> {
    colors.sort_by_cached_key(|color| {
        Reverse((
            OrderedFloat(color.ratio.unwrap_or(0.0)),
            OrderedFloat(relative_luminance(color.srgb)),
        ))
    });
    colors
}

/// Splits ranked colors into the dominant color and the remaining color keys.
///
/// Returns `None` if `ranked` is empty.
#[must_use]
pub fn into_palette(ranked: Vec<Color>) -> Option<PaletteResult> {
    let mut keys = ranked.into_iter().map(|color| color.key);
    let dominant_color = keys.next()?;
    Some(PaletteResult {
        colors: keys.collect(),
        dominant_color,
    })
}
