//! Systematic pixel sampling.
//!
//! Pixels are sampled at a fixed stride over the row-major pixel order rather than at random,
//! so the same buffer and sample rate always produce the same samples.
//! The scan is split into batches of [`SAMPLE_BATCH_SIZE`] pixels. The batches are independent of
//! each other and are processed concurrently by [`sample_pixels_par`], but the batching never
//! changes which pixels are sampled.

use crate::{PixelBuffer, CHANNELS};

use std::ops::Range;

use palette::Srgb;

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The number of pixels scanned per batch.
pub const SAMPLE_BATCH_SIZE: usize = 10_000;

/// Returns the sampling stride for the given sample rate: `round(1 / sample_rate)`, at least `1`.
///
/// The sample rate is expected to be in `(0, 1]`;
/// see [`ExtractOptions::validate`](crate::ExtractOptions::validate).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sample_step(sample_rate: f64) -> usize {
    // round half up
    let step = (sample_rate.recip() + 0.5).floor();
    if step >= 1.0 {
        step as usize
    } else {
        1
    }
}

/// Splits `0..total` into consecutive batches of at most [`SAMPLE_BATCH_SIZE`].
fn batches(total: usize) -> impl Iterator<Item = Range<usize>> {
    (0..total)
        .step_by(SAMPLE_BATCH_SIZE)
        .map(move |start| start..(start + SAMPLE_BATCH_SIZE).min(total))
}

/// Samples every pixel index `i` in `batch` with `i % step == 0`.
fn sample_batch(buffer: &PixelBuffer, step: usize, batch: Range<usize>, samples: &mut Vec<Srgb<u8>>) {
    let width = buffer.width() as usize;
    let data = buffer.as_raw();

    // align to the global stride so batch boundaries do not shift the sample positions
    let first = batch.start.next_multiple_of(step);

    for i in (first..batch.end).step_by(step) {
        let (x, y) = (i % width, i / width);
        let offset = (y * width + x) * CHANNELS;
        if let Some(&[r, g, b]) = data.get(offset..offset + 3) {
            samples.push(Srgb::new(r, g, b));
        }
    }
}

/// Samples the RGB components of every `step`-th pixel of `buffer`, dropping alpha.
///
/// # Examples
/// ```
/// # use chromapick::{PixelBuffer, sample::sample_pixels};
/// # fn main() -> Result<(), chromapick::ExtractError> {
/// let pixels = (0..16).flat_map(|i| [i, i, i, 255]).collect::<Vec<u8>>();
/// let buffer = PixelBuffer::new(4, 4, &pixels)?;
///
/// let samples = sample_pixels(&buffer, 0.25);
/// let reds = samples.iter().map(|c| c.red).collect::<Vec<_>>();
/// assert_eq!(reds, [0, 4, 8, 12]);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn sample_pixels(buffer: &PixelBuffer, sample_rate: f64) -> Vec<Srgb<u8>> {
    let step = sample_step(sample_rate);
    let total = buffer.num_pixels();

    let mut samples = Vec::with_capacity(total.div_ceil(step));
    for batch in batches(total) {
        sample_batch(buffer, step, batch, &mut samples);
    }

    log::trace!("sampled {} of {total} pixels (step {step})", samples.len());

    samples
}

/// Samples pixels like [`sample_pixels`], but processes the batches in parallel.
///
/// The returned samples are identical, including their order, to those of [`sample_pixels`].
#[cfg(feature = "threads")]
#[must_use]
pub fn sample_pixels_par(buffer: &PixelBuffer, sample_rate: f64) -> Vec<Srgb<u8>> {
    let step = sample_step(sample_rate);
    let total = buffer.num_pixels();

    let samples = batches(total)
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|batch| {
            let mut samples = Vec::with_capacity(batch.len().div_ceil(step));
            sample_batch(buffer, step, batch, &mut samples);
            samples
        })
        .collect::<Vec<_>>()
        .concat();

    log::trace!("sampled {} of {total} pixels (step {step})", samples.len());

    samples
}
