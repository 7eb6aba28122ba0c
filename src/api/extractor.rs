//! Contains the [`ColorExtractor`] and the extraction pipeline.

use super::ExtractOptions;
use crate::{
    format::{format_colors, ColorFormat},
    kmeans, rank,
    sample::sample_pixels,
    similar::merge_similar,
    stabilize::stabilize,
    Color, ExtractError, PaletteResult, PixelBuffer, RUNS,
};

use palette::Srgb;

#[cfg(feature = "threads")]
use {crate::sample::sample_pixels_par, rayon::prelude::*};

#[cfg(feature = "image")]
use {
    crate::loader::{prepare_canvas, ImageLoader},
    image::DynamicImage,
};

/// Runs one clustering pass over the samples and formats (and optionally merges) its colors.
fn run_once(samples: &[Srgb<u8>], options: &ExtractOptions) -> Result<Vec<Color>, ExtractError> {
    let clusters = kmeans::cluster(samples, options.k, options.seed);
    let colors = format_colors(&clusters.centroids, ColorFormat::from_use_hex(options.use_hex))?;

    if options.filter_similar_colors {
        Ok(merge_similar(colors, &clusters.ratios(), options.similarity_threshold))
    } else {
        Ok(colors)
    }
}

/// Stabilizes the colors of all runs and ranks them.
fn finish(runs: Vec<Vec<Color>>) -> Result<PaletteResult, ExtractError> {
    let stable = stabilize(runs.into_iter().flatten());
    log::debug!("stabilized palette has {} colors", stable.len());

    rank::into_palette(rank::rank(stable))
        .ok_or_else(|| ExtractError::extraction("no colors survived stabilization"))
}

fn check_samples(samples: &[Srgb<u8>]) -> Result<(), ExtractError> {
    if samples.is_empty() {
        Err(ExtractError::extraction("no pixels were sampled"))
    } else {
        Ok(())
    }
}

/// Extracts a ranked palette from `buffer`.
///
/// The samples are clustered [`RUNS`] times with the same seed, and the colors of all runs
/// are stabilized into a single palette before ranking.
///
/// # Errors
/// Returns [`ExtractError::InvalidInput`] if the `options` are invalid; no work is done in that case.
/// Returns [`ExtractError::Extraction`] if the pipeline hits an unexpected fault.
///
/// # Examples
/// ```
/// # use chromapick::{extract_palette, ExtractOptions, PixelBuffer};
/// # fn main() -> Result<(), chromapick::ExtractError> {
/// let pixels = [[255, 0, 0, 255], [0, 0, 255, 255]].concat().repeat(8);
/// let buffer = PixelBuffer::new(4, 4, &pixels)?;
///
/// let options = ExtractOptions::new().k(2).sample_rate(1.0).use_hex(true);
/// let palette = extract_palette(&buffer, &options)?;
///
/// assert_eq!(palette.dominant_color, "#ff0000");
/// assert_eq!(palette.colors, ["#0000ff"]);
/// # Ok(())
/// # }
/// ```
pub fn extract_palette(
    buffer: &PixelBuffer,
    options: &ExtractOptions,
) -> Result<PaletteResult, ExtractError> {
    options.validate()?;

    let samples = sample_pixels(buffer, options.sample_rate);
    check_samples(&samples)?;
    log::debug!(
        "clustering {} samples into {} clusters, {RUNS} runs",
        samples.len(),
        options.k
    );

    let runs = (0..RUNS)
        .map(|_| run_once(&samples, options))
        .collect::<Result<Vec<_>, _>>()?;

    finish(runs)
}

/// Extracts a ranked palette like [`extract_palette`], but samples in parallel
/// and performs the clustering runs in parallel.
///
/// The result is identical to that of [`extract_palette`].
///
/// # Errors
/// See [`extract_palette`].
#[cfg(feature = "threads")]
pub fn extract_palette_par(
    buffer: &PixelBuffer,
    options: &ExtractOptions,
) -> Result<PaletteResult, ExtractError> {
    options.validate()?;

    let samples = sample_pixels_par(buffer, options.sample_rate);
    check_samples(&samples)?;
    log::debug!(
        "clustering {} samples into {} clusters, {RUNS} parallel runs",
        samples.len(),
        options.k
    );

    let runs = (0..RUNS)
        .into_par_iter()
        .map(|_| run_once(&samples, options))
        .collect::<Result<Vec<_>, _>>()?;

    finish(runs)
}

/// An explicitly constructed color extractor holding an image loading capability.
///
/// The loader is only used by [`extract_from`](ColorExtractor::extract_from);
/// extracting from a [`PixelBuffer`] works with any loader, including `()`.
///
/// # Examples
/// ```no_run
/// # use chromapick::{ColorExtractor, ExtractOptions, loader::MemoryLoader};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("some image")?;
/// let extractor = ColorExtractor::new(MemoryLoader);
/// let palette = extractor.extract_from(bytes.as_slice(), &ExtractOptions::new())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorExtractor<Loader> {
    /// The image loading capability.
    loader: Loader,
}

impl<Loader> ColorExtractor<Loader> {
    /// Creates a new [`ColorExtractor`] with the given image loader.
    #[must_use]
    pub const fn new(loader: Loader) -> Self {
        Self { loader }
    }

    /// The image loader of this extractor.
    #[must_use]
    pub const fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Extracts a palette from an already decoded buffer. See [`extract_palette`].
    ///
    /// # Errors
    /// See [`extract_palette`].
    pub fn extract(
        &self,
        buffer: &PixelBuffer,
        options: &ExtractOptions,
    ) -> Result<PaletteResult, ExtractError> {
        extract_palette(buffer, options)
    }

    /// Extracts a palette from an already decoded buffer in parallel. See [`extract_palette_par`].
    ///
    /// # Errors
    /// See [`extract_palette`].
    #[cfg(feature = "threads")]
    pub fn extract_par(
        &self,
        buffer: &PixelBuffer,
        options: &ExtractOptions,
    ) -> Result<PaletteResult, ExtractError> {
        extract_palette_par(buffer, options)
    }

    /// Downscales `image` to fit the canvas and extracts a palette from it.
    ///
    /// # Errors
    /// See [`extract_palette`]. An image with zero area is [`ExtractError::InvalidInput`].
    #[cfg(feature = "image")]
    pub fn extract_image(
        &self,
        image: &DynamicImage,
        options: &ExtractOptions,
    ) -> Result<PaletteResult, ExtractError> {
        options.validate()?;
        let canvas = prepare_canvas(image);
        extract_palette(&PixelBuffer::try_from(&canvas)?, options)
    }

    /// Downscales `image` to fit the canvas and extracts a palette from it in parallel.
    ///
    /// # Errors
    /// See [`extract_image`](Self::extract_image).
    #[cfg(all(feature = "image", feature = "threads"))]
    pub fn extract_image_par(
        &self,
        image: &DynamicImage,
        options: &ExtractOptions,
    ) -> Result<PaletteResult, ExtractError> {
        options.validate()?;
        let canvas = prepare_canvas(image);
        extract_palette_par(&PixelBuffer::try_from(&canvas)?, options)
    }
}

#[cfg(feature = "image")]
impl<Loader: ImageLoader> ColorExtractor<Loader> {
    /// Loads an image through this extractor's loader and extracts a palette from it.
    ///
    /// The options are validated before the image is loaded.
    ///
    /// # Errors
    /// Returns [`ExtractError::ImageLoad`] if the loader fails. Otherwise, see [`extract_image`](Self::extract_image).
    pub fn extract_from(
        &self,
        source: &Loader::Source,
        options: &ExtractOptions,
    ) -> Result<PaletteResult, ExtractError> {
        options.validate()?;
        let image = self.loader.load(source)?;
        self.extract_image(&image, options)
    }

    /// Loads an image through this extractor's loader and extracts a palette from it in parallel.
    ///
    /// # Errors
    /// See [`extract_from`](Self::extract_from).
    #[cfg(feature = "threads")]
    pub fn extract_from_par(
        &self,
        source: &Loader::Source,
        options: &ExtractOptions,
    ) -> Result<PaletteResult, ExtractError> {
        options.validate()?;
        let image = self.loader.load(source)?;
        self.extract_image_par(&image, options)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn extract(data: &[u8], width: u32, height: u32, options: &ExtractOptions) -> PaletteResult {
        let buffer = PixelBuffer::new(width, height, data).unwrap();
        extract_palette(&buffer, options).unwrap()
    }

    fn distinct_count(buffer: &PixelBuffer, options: &ExtractOptions) -> usize {
        let samples = sample_pixels(buffer, options.sample_rate);
        let runs = (0..RUNS)
            .map(|_| run_once(&samples, options))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        stabilize(runs.into_iter().flatten()).len()
    }

    #[test]
    fn solid_red_is_dominant() {
        let data = solid_image(2, 2, RED);

        let options = ExtractOptions::new().k(2).sample_rate(1.0);
        let palette = extract(&data, 2, 2, &options);
        assert_eq!(palette.dominant_color, "rgb(255, 0, 0)");
        assert!(palette.colors.len() <= 1);

        let palette = extract(&data, 2, 2, &options.use_hex(true));
        assert_eq!(palette.dominant_color, "#ff0000");
        assert!(palette.colors.len() <= 1);
    }

    #[test]
    fn four_regions_four_colors() {
        let data = quadrant_image(16, 16);
        let options = ExtractOptions::new().k(4).sample_rate(1.0);

        let palette = extract(&data, 16, 16, &options);
        assert_eq!(palette.colors.len(), 3);

        // unweighted colors are ranked by luminance
        assert_eq!(palette.dominant_color, "rgb(255, 255, 255)");
        assert_eq!(
            palette.colors,
            ["rgb(0, 255, 0)", "rgb(255, 0, 0)", "rgb(0, 0, 255)"]
        );
    }

    #[test]
    fn filtered_colors_are_ranked_by_ratio() {
        // 3/4 red, 1/4 blue
        let mut data = solid_image(8, 6, RED);
        data.extend(solid_image(8, 2, BLUE));

        let options = ExtractOptions::new()
            .k(2)
            .sample_rate(1.0)
            .filter_similar_colors(true);

        let palette = extract(&data, 8, 8, &options);
        assert_eq!(palette.dominant_color, "rgb(255, 0, 0)");
        assert_eq!(palette.colors, ["rgb(0, 0, 255)"]);
    }

    #[test]
    fn colors_len_is_distinct_count_minus_one() {
        let data = noise_image(48, 48, 21);
        let buffer = PixelBuffer::new(48, 48, &data).unwrap();

        for filter in [false, true] {
            let options = ExtractOptions::new()
                .k(8)
                .sample_rate(0.5)
                .filter_similar_colors(filter);

            let palette = extract_palette(&buffer, &options).unwrap();
            assert_eq!(palette.colors.len(), distinct_count(&buffer, &options) - 1);
            assert!(!palette.colors.contains(&palette.dominant_color));
        }
    }

    #[test]
    fn output_matches_format() {
        let data = noise_image(32, 32, 4);

        let palette = extract(&data, 32, 32, &ExtractOptions::new().k(6).use_hex(true));
        assert!(palette.iter().all(is_hex_key));

        let palette = extract(&data, 32, 32, &ExtractOptions::new().k(6));
        assert!(palette.iter().all(is_rgb_key));
    }

    #[test]
    fn filtering_never_adds_colors() {
        for seed in 0..4 {
            let data = noise_image(40, 30, seed);
            let options = ExtractOptions::new().k(10).sample_rate(1.0);

            let unfiltered = extract(&data, 40, 30, &options);
            let filtered = extract(&data, 40, 30, &options.filter_similar_colors(true));
            assert!(filtered.colors.len() <= unfiltered.colors.len());
        }
    }

    #[test]
    fn deterministic() {
        let data = noise_image(64, 64, 8);
        let options = ExtractOptions::new().k(7).filter_similar_colors(true);
        assert_eq!(extract(&data, 64, 64, &options), extract(&data, 64, 64, &options));
    }

    #[test]
    fn invalid_options_fail_fast() {
        let data = solid_image(2, 2, RED);
        let buffer = PixelBuffer::new(2, 2, &data).unwrap();

        for options in [
            ExtractOptions::new().k(0),
            ExtractOptions::new().k(u32::MAX).sample_rate(1.0),
            ExtractOptions::new().sample_rate(0.0),
            ExtractOptions::new().sample_rate(1.5),
        ] {
            let err = extract_palette(&buffer, &options).unwrap_err();
            assert!(err.is_invalid_input());
        }
    }

    #[test]
    fn extractor_without_loader() {
        let data = solid_image(3, 3, GREEN);
        let buffer = PixelBuffer::new(3, 3, &data).unwrap();

        let extractor = ColorExtractor::new(());
        let palette = extractor.extract(&buffer, &ExtractOptions::new().k(1)).unwrap();
        assert_eq!(palette.dominant_color, "rgb(0, 255, 0)");
        assert!(palette.colors.is_empty());
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let data = noise_image(120, 100, 13);
        let buffer = PixelBuffer::new(120, 100, &data).unwrap();

        for filter in [false, true] {
            let options = ExtractOptions::new().k(9).filter_similar_colors(filter);
            let single = extract_palette(&buffer, &options).unwrap();
            let par = extract_palette_par(&buffer, &options).unwrap();
            assert_eq!(single, par);
        }
    }
}
