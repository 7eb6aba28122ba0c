//! Image loading capabilities for [`ColorExtractor`](crate::ColorExtractor).
//!
//! A loader turns some image source into a decoded [`DynamicImage`]. Two capabilities are provided:
//! - [`MemoryLoader`] decodes encoded image bytes that the host already holds in memory.
//! - [`FileLoader`] reads and decodes an image file from the file system.
//!
//! Either way, the decoded image is passed through [`prepare_canvas`] before sampling,
//! which bounds the sampling cost of very large images.

use crate::LoadError;

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, RgbaImage};

/// The maximum width or height of the canvas that pixels are sampled from.
pub const MAX_CANVAS_DIMENSION: u32 = 1000;

/// A capability that loads an image from a source.
pub trait ImageLoader {
    /// The type of image source this loader accepts.
    type Source: ?Sized;

    /// Loads and decodes the image at `source`.
    ///
    /// # Errors
    /// Returns a [`LoadError`] if the source could not be read or decoded.
    fn load(&self, source: &Self::Source) -> Result<DynamicImage, LoadError>;
}

/// Loads images from encoded bytes in memory, guessing the format from the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryLoader;

impl ImageLoader for MemoryLoader {
    type Source = [u8];

    fn load(&self, source: &[u8]) -> Result<DynamicImage, LoadError> {
        Ok(image::load_from_memory(source)?)
    }
}

/// Loads images from files on the file system, guessing the format from the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileLoader;

impl ImageLoader for FileLoader {
    type Source = Path;

    fn load(&self, source: &Path) -> Result<DynamicImage, LoadError> {
        log::debug!("loading image from {}", source.display());

        let bytes = std::fs::read(source).map_err(|e| LoadError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;

        Ok(image::load_from_memory(&bytes)?)
    }
}

impl<L: ImageLoader + ?Sized> ImageLoader for &L {
    type Source = L::Source;

    fn load(&self, source: &Self::Source) -> Result<DynamicImage, LoadError> {
        (**self).load(source)
    }
}

/// Returns the dimensions of `(width, height)` scaled down, preserving aspect ratio,
/// to fit within [`MAX_CANVAS_DIMENSION`]. Dimensions that already fit are returned unchanged.
///
/// The longer side becomes exactly [`MAX_CANVAS_DIMENSION`] and the shorter side is rounded down.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn canvas_dimensions(width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= MAX_CANVAS_DIMENSION {
        return (width, height);
    }

    let scale = |d: u32| {
        (u64::from(d) * u64::from(MAX_CANVAS_DIMENSION) / u64::from(longest)).max(1) as u32
    };

    (scale(width), scale(height))
}

/// Converts `image` to RGBA, downscaling it to fit [`canvas_dimensions`] if needed.
#[must_use]
pub fn prepare_canvas(image: &DynamicImage) -> RgbaImage {
    let (width, height) = (image.width(), image.height());
    let (canvas_width, canvas_height) = canvas_dimensions(width, height);

    if (canvas_width, canvas_height) == (width, height) {
        image.to_rgba8()
    } else {
        log::debug!("resizing {width}x{height} image to {canvas_width}x{canvas_height}");
        image::imageops::resize(image, canvas_width, canvas_height, FilterType::Triangle)
    }
}
