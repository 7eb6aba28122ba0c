//! A library for extracting a small, stable color palette and a single dominant color from an image.
//!
//! `chromapick` samples pixels from an RGBA buffer, clusters the samples with a seeded k-means
//! several times over, and then merges the runs into one ranked palette. Repeating the clustering
//! and averaging the per-color weights across runs is what keeps the palette stable.
//!
//! # Features
//! To reduce dependencies and compile times, `chromapick` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes parallel versions of sampling and of the clustering runs via [`rayon`].
//! - `image`: enables integration with the [`image`] crate, including the image loaders in [`loader`].
//!
//! # High-Level API
//! To get started, construct a [`ColorExtractor`] with the image loader of your choice
//! and configure an extraction through [`ExtractOptions`]:
//! ```no_run
//! # use chromapick::{ColorExtractor, ExtractOptions, loader::FileLoader};
//! # use std::path::Path;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = ColorExtractor::new(FileLoader);
//!
//! let options = ExtractOptions::new()
//!     .k(6) // number of clusters per run
//!     .sample_rate(0.25) // sample every 4th pixel
//!     .use_hex(true);
//!
//! let palette = extractor.extract_from(Path::new("some image"), &options)?;
//! println!("dominant: {}", palette.dominant_color);
//! # Ok(())
//! # }
//! ```
//!
//! If you already have decoded pixels, skip the loader and use [`extract_palette`]:
//! ```
//! # use chromapick::{extract_palette, ExtractOptions, PixelBuffer};
//! # fn main() -> Result<(), chromapick::ExtractError> {
//! let pixels = [255, 0, 0, 255].repeat(4);
//! let buffer = PixelBuffer::new(2, 2, &pixels)?;
//!
//! let palette = extract_palette(&buffer, &ExtractOptions::new().k(2).sample_rate(1.0))?;
//! assert_eq!(palette.dominant_color, "rgb(255, 0, 0)");
//! # Ok(())
//! # }
//! ```
//!
//! Note that some of the options and functions above require certain features to be enabled.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod api;
mod error;
mod types;

pub mod format;
pub mod kmeans;
pub mod rank;
pub mod sample;
pub mod similar;
pub mod stabilize;

#[cfg(feature = "image")]
pub mod loader;

pub use api::*;
pub use error::*;
pub use types::*;

/// The number of independent clustering runs performed per extraction.
pub const RUNS: u32 = 5;

/// The maximum supported number of clusters per run is `256`.
pub const MAX_K: u32 = 256;
