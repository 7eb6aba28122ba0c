//! Contains the types and functions for the high level extraction API.

mod extractor;

pub use extractor::*;

use crate::{similar::SIMILARITY_THRESHOLD, ExtractError, MAX_K};

/// A builder struct to specify the parameters for a color extraction.
///
/// # Examples
/// ```
/// # use chromapick::ExtractOptions;
/// let options = ExtractOptions::new()
///     .k(8)
///     .sample_rate(0.5)
///     .filter_similar_colors(true)
///     .use_hex(true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    /// The number of clusters per k-means run.
    pub(crate) k: u32,
    /// The proportion of pixels to sample.
    pub(crate) sample_rate: f64,
    /// Whether to merge perceptually similar colors within each run.
    pub(crate) filter_similar_colors: bool,
    /// Whether to output `#rrggbb` keys instead of `rgb(r, g, b)`.
    pub(crate) use_hex: bool,
    /// The seed value for the random number generator of every k-means run.
    pub(crate) seed: u64,
    /// The CIEDE2000 distance below which colors are merged.
    pub(crate) similarity_threshold: f32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// The default number of clusters.
    pub const DEFAULT_K: u32 = 10;

    /// The default sample rate.
    pub const DEFAULT_SAMPLE_RATE: f64 = 0.1;

    /// The default seed.
    pub const DEFAULT_SEED: u64 = 42;

    /// Creates a new [`ExtractOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            k: Self::DEFAULT_K,
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            filter_similar_colors: false,
            use_hex: false,
            seed: Self::DEFAULT_SEED,
            similarity_threshold: SIMILARITY_THRESHOLD,
        }
    }

    /// Sets the number of clusters computed by each k-means run.
    ///
    /// This is an upper bound on the number of palette colors.
    /// It must be in `1..=MAX_K`, see [`MAX_K`]. The default is `10`.
    #[must_use]
    pub const fn k(mut self, k: u32) -> Self {
        self.k = k;
        self
    }

    /// Sets the proportion of pixels to sample. Every `round(1 / sample_rate)`-th pixel is sampled.
    ///
    /// It must be in `(0, 1]`. The default is `0.1`, that is, to sample every 10th pixel.
    #[must_use]
    pub const fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sets whether to merge perceptually similar colors within each k-means run.
    ///
    /// When enabled, each color is weighted by the proportion of samples in its cluster,
    /// and the palette is ranked by these weights. When disabled, colors carry no weight
    /// and the palette is ranked by luminance alone.
    ///
    /// The default is `false`.
    #[must_use]
    pub const fn filter_similar_colors(mut self, filter: bool) -> Self {
        self.filter_similar_colors = filter;
        self
    }

    /// Sets whether to format colors as `#rrggbb` instead of `rgb(r, g, b)`.
    ///
    /// The default is `false`.
    #[must_use]
    pub const fn use_hex(mut self, use_hex: bool) -> Self {
        self.use_hex = use_hex;
        self
    }

    /// Sets the seed value for the random number generator.
    ///
    /// Every k-means run of an extraction uses this same seed. The default seed is `42`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the CIEDE2000 distance below which colors are merged
    /// when [`filter_similar_colors`](Self::filter_similar_colors) is enabled.
    ///
    /// The default threshold is `20`.
    #[must_use]
    pub const fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// The number of clusters per k-means run.
    #[must_use]
    pub const fn get_k(&self) -> u32 {
        self.k
    }

    /// The proportion of pixels to sample.
    #[must_use]
    pub const fn get_sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Checks that the options are in range.
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidInput`] if `k` is `0` or above [`MAX_K`], if the sample rate is not in `(0, 1]`,
    /// or if the similarity threshold is negative or not finite.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.k == 0 {
            return Err(ExtractError::invalid_input("k must be a positive integer"));
        }

        if self.k > MAX_K {
            return Err(ExtractError::invalid_input(format!(
                "k must be at most {MAX_K}, but was {}",
                self.k
            )));
        }

        if !(self.sample_rate > 0.0 && self.sample_rate <= 1.0) {
            return Err(ExtractError::invalid_input(format!(
                "sample rate must be in (0, 1], but was {}",
                self.sample_rate
            )));
        }

        if !(self.similarity_threshold.is_finite() && self.similarity_threshold >= 0.0) {
            return Err(ExtractError::invalid_input(format!(
                "similarity threshold must be a non-negative number, but was {}",
                self.similarity_threshold
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = ExtractOptions::new();
        assert_eq!(options, ExtractOptions::default());
        assert_eq!(options.get_k(), 10);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn rejects_zero_k() {
        assert!(ExtractOptions::new().k(0).validate().unwrap_err().is_invalid_input());
    }

    #[test]
    fn rejects_k_above_max() {
        assert!(ExtractOptions::new().k(MAX_K).validate().is_ok());
        for k in [MAX_K + 1, u32::MAX] {
            assert!(ExtractOptions::new().k(k).validate().unwrap_err().is_invalid_input());
        }
    }

    #[test]
    fn rejects_out_of_range_sample_rate() {
        for rate in [0.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            let result = ExtractOptions::new().sample_rate(rate).validate();
            assert!(result.is_err_and(|e| e.is_invalid_input()), "sample rate {rate}");
        }
    }

    #[test]
    fn accepts_boundary_sample_rate() {
        assert!(ExtractOptions::new().sample_rate(1.0).validate().is_ok());
        assert!(ExtractOptions::new().sample_rate(1e-9).validate().is_ok());
    }

    #[test]
    fn rejects_bad_threshold() {
        for threshold in [-1.0, f32::NAN, f32::INFINITY] {
            let result = ExtractOptions::new().similarity_threshold(threshold).validate();
            assert!(result.is_err_and(|e| e.is_invalid_input()));
        }
    }
}
