//! Contains various types needed across the crate.

use crate::ExtractError;

use palette::Srgb;

#[cfg(feature = "image")]
use image::RgbaImage;

/// The number of bytes per pixel in a [`PixelBuffer`] (interleaved RGBA).
pub const CHANNELS: usize = 4;

/// A borrowed, immutable view over an RGBA image.
///
/// The invariant of this type is that the length of the byte slice is exactly
/// `width * height * 4` and that the image has a non-zero area.
///
/// # Examples
/// From raw bytes:
/// ```
/// # use chromapick::{PixelBuffer, ExtractError};
/// # fn main() -> Result<(), ExtractError> {
/// let pixels = vec![0; 3 * 2 * 4];
/// let buffer = PixelBuffer::new(3, 2, &pixels)?;
/// assert_eq!(buffer.num_pixels(), 6);
/// # Ok(())
/// # }
/// ```
///
/// From an image (needs the `image` feature to be enabled):
/// ```no_run
/// # use chromapick::PixelBuffer;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgba8();
/// let buffer = PixelBuffer::try_from(&img)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBuffer<'a> {
    /// The width of the image in pixels.
    width: u32,
    /// The height of the image in pixels.
    height: u32,
    /// Interleaved RGBA bytes in row-major order.
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    /// Creates a new [`PixelBuffer`] after checking the length of `data` against the dimensions.
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidInput`] if the image has zero area
    /// or if `data` is not exactly `width * height * 4` bytes long.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, ExtractError> {
        if width == 0 || height == 0 {
            return Err(ExtractError::invalid_input(format!(
                "pixel buffer has zero area ({width}x{height})"
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(CHANNELS));

        match expected {
            Some(len) if len == data.len() => Ok(Self { width, height, data }),
            _ => Err(ExtractError::invalid_input(format!(
                "a {width}x{height} RGBA buffer needs {} bytes, but {} were given",
                expected.map_or_else(|| "more than usize::MAX".to_owned(), |len| len.to_string()),
                data.len()
            ))),
        }
    }

    /// The width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The number of pixels in the image.
    #[must_use]
    pub const fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The raw interleaved RGBA bytes.
    #[must_use]
    pub const fn as_raw(&self) -> &'a [u8] {
        self.data
    }
}

#[cfg(feature = "image")]
impl<'a> TryFrom<&'a RgbaImage> for PixelBuffer<'a> {
    type Error = ExtractError;

    fn try_from(image: &'a RgbaImage) -> Result<Self, Self::Error> {
        Self::new(image.width(), image.height(), image.as_raw())
    }
}

/// A palette color as it moves through the formatting, merging, and stabilization stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    /// The canonical string form of the color, either `rgb(r, g, b)` or `#rrggbb`.
    ///
    /// Two colors are the same color exactly when their keys are equal.
    pub key: String,
    /// The rounded color that `key` denotes.
    pub srgb: Srgb<u8>,
    /// The unrounded centroid this color originated from.
    pub value: [f64; 3],
    /// The proportion of samples attributed to this color, if one has been computed.
    pub ratio: Option<f64>,
}

/// The output of an extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaletteResult {
    /// The remaining palette colors in ranked order. Never contains `dominant_color`.
    pub colors: Vec<String>,
    /// The highest ranked color.
    pub dominant_color: String,
}

impl PaletteResult {
    /// Iterates over all palette colors in ranked order, starting with the dominant color.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.dominant_color.as_str()).chain(self.colors.iter().map(String::as_str))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_length() {
        let data = vec![0; 15];
        let err = PixelBuffer::new(2, 2, &data).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn rejects_zero_area() {
        assert!(PixelBuffer::new(0, 4, &[]).unwrap_err().is_invalid_input());
        assert!(PixelBuffer::new(4, 0, &[]).unwrap_err().is_invalid_input());
    }

    #[test]
    fn accepts_exact_length() {
        let data = vec![0; 3 * 5 * 4];
        let buffer = PixelBuffer::new(3, 5, &data).unwrap();
        assert_eq!(buffer.width(), 3);
        assert_eq!(buffer.height(), 5);
        assert_eq!(buffer.num_pixels(), 15);
        assert_eq!(buffer.as_raw().len(), 60);
    }

    #[test]
    fn palette_iter_starts_with_dominant() {
        let palette = PaletteResult {
            colors: vec!["#00ff00".to_owned(), "#0000ff".to_owned()],
            dominant_color: "#ff0000".to_owned(),
        };
        assert_eq!(
            palette.iter().collect::<Vec<_>>(),
            ["#ff0000", "#00ff00", "#0000ff"]
        );
    }

    #[cfg(feature = "image")]
    #[test]
    fn from_rgba_image() {
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([1, 2, 3, 4]));
        let buffer = PixelBuffer::try_from(&img).unwrap();
        assert_eq!(buffer.num_pixels(), 12);
        assert_eq!(&buffer.as_raw()[..4], &[1, 2, 3, 4]);
    }
}
