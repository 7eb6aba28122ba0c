//! Error types returned by extraction and by the image loaders.

#[cfg(feature = "image")]
use std::{io, path::PathBuf};

use thiserror::Error;

/// The error type returned by every extraction entry point.
///
/// Validation errors ([`ExtractError::InvalidInput`]) are raised before any sampling or clustering
/// takes place, so an extraction either fails up front or runs to completion.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The pixel buffer or the [`ExtractOptions`](crate::ExtractOptions) were rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The image loader could not produce an image. The loader's error is passed through unchanged.
    #[cfg(feature = "image")]
    #[error(transparent)]
    ImageLoad(#[from] LoadError),
    /// An unexpected fault inside the pipeline, e.g., a non-finite centroid.
    #[error("color extraction failed: {0}")]
    Extraction(String),
}

impl ExtractError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Returns `true` if this is an [`ExtractError::InvalidInput`].
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// The error type returned by [`ImageLoader`](crate::loader::ImageLoader) implementations.
#[cfg(feature = "image")]
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image source could not be read.
    #[error("failed to read image from {}", path.display())]
    Io {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The image data could not be decoded.
    #[error("failed to decode image")]
    Decode(#[from] image::ImageError),
}
