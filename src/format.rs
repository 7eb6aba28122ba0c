//! Conversion of cluster centroids into keyed [`Color`]s.

use crate::{Color, ExtractError};

use std::fmt::{self, Display};

use palette::Srgb;

/// The string form used for color keys.
///
/// The key of a color is its identity: the stabilization stage merges colors
/// only when their keys are equal, so formatting never depends on locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorFormat {
    /// `rgb(r, g, b)` with decimal components.
    #[default]
    Rgb,
    /// `#rrggbb` with lowercase hex digits.
    Hex,
}

impl ColorFormat {
    /// Returns [`ColorFormat::Hex`] if `use_hex` is `true`, or [`ColorFormat::Rgb`] otherwise.
    #[must_use]
    pub const fn from_use_hex(use_hex: bool) -> Self {
        if use_hex {
            Self::Hex
        } else {
            Self::Rgb
        }
    }

    /// Formats `color` as a key.
    ///
    /// # Examples
    /// ```
    /// # use chromapick::format::ColorFormat;
    /// # use palette::Srgb;
    /// let color = Srgb::new(255, 8, 171);
    /// assert_eq!(ColorFormat::Rgb.key(color), "rgb(255, 8, 171)");
    /// assert_eq!(ColorFormat::Hex.key(color), "#ff08ab");
    /// ```
    #[must_use]
    pub fn key(self, color: Srgb<u8>) -> String {
        let (r, g, b) = color.into_components();
        match self {
            Self::Rgb => format!("rgb({r}, {g}, {b})"),
            Self::Hex => format!("#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ColorFormat::Rgb => "rgb",
                ColorFormat::Hex => "hex",
            }
        )
    }
}

/// Rounds each centroid component half up and clamps it to `[0, 255]`.
///
/// # Errors
/// Returns [`ExtractError::Extraction`] if any component is not finite.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_centroid(centroid: [f64; 3]) -> Result<Srgb<u8>, ExtractError> {
    if let Some(c) = centroid.iter().find(|c| !c.is_finite()) {
        return Err(ExtractError::extraction(format!(
            "clustering produced a non-finite centroid component ({c})"
        )));
    }

    let [r, g, b] = centroid.map(|c| (c + 0.5).floor().clamp(0.0, 255.0) as u8);
    Ok(Srgb::new(r, g, b))
}

/// Converts the centroids of one clustering run into [`Color`]s, preserving centroid order.
///
/// The returned colors have no `ratio`.
///
/// # Errors
/// Returns [`ExtractError::Extraction`] if any centroid has a non-finite component.
pub fn format_colors(centroids: &[[f64; 3]], format: ColorFormat) -> Result<Vec<Color>, ExtractError> {
    centroids
        .iter()
        .map(|&value| {
            let srgb = round_centroid(value)?;
            Ok(Color {
                key: format.key(srgb),
                srgb,
                value,
                ratio: None,
            })
        })
        .collect()
}
