//! Merging of perceptually similar colors within a single clustering run.

use crate::Color;

use palette::{color_difference::Ciede2000, IntoColor, Lab, Srgb};

/// The default CIEDE2000 distance below which two colors are merged.
pub const SIMILARITY_THRESHOLD: f32 = 20.0;

fn to_lab(color: Srgb<u8>) -> Lab {
    color.into_format::<f32>().into_color()
}

/// The CIEDE2000 color difference between two colors.
///
/// # Examples
/// ```
/// # use chromapick::similar::perceptual_distance;
/// # use palette::Srgb;
/// let red = Srgb::new(255, 0, 0);
/// assert!(perceptual_distance(red, red) < 1e-6);
/// assert!(perceptual_distance(red, Srgb::new(0, 0, 255)) > 20.0);
/// ```
#[must_use]
pub fn perceptual_distance(a: Srgb<u8>, b: Srgb<u8>) -> f32 {
    to_lab(a).difference(to_lab(b))
}

/// Merges colors that are closer than `threshold` to an earlier color.
///
/// `ratios[i]` is the proportion of samples belonging to `colors[i]`.
/// Colors are visited in order. A color that is not similar to any kept color is kept with its
/// own ratio. Otherwise its ratio is added to the first kept color it is similar to, and it is dropped.
/// So the first color seen in a group of similar colors represents the group.
#[must_use]
pub fn merge_similar(colors: Vec<Color>, ratios: &[f64], threshold: f32) -> Vec<Color> {
    let mut kept: Vec<(Color, Lab)> = Vec::with_capacity(colors.len());

    for (i, color) in colors.into_iter().enumerate() {
        let ratio = ratios.get(i).copied().unwrap_or(0.0);
        let lab = to_lab(color.srgb);

        match kept
            .iter()
            .position(|(_, kept_lab)| lab.difference(*kept_lab) < threshold)
        {
            Some(j) => {
                let representative = &mut kept[j].0;
                representative.ratio = Some(representative.ratio.unwrap_or(0.0) + ratio);
            }
            None => kept.push((Color { ratio: Some(ratio), ..color }, lab)),
        }
    }

    kept.into_iter().map(|(color, _)| color).collect()
}
