// The clustering here is Lloyd's k-means with k-means++ seeding:
//
// Arthur, D. & Vassilvitskii, S. k-means++: The Advantages of Careful Seeding.
// Proceedings of the 18th Annual ACM-SIAM Symposium on Discrete Algorithms, 1027–1035, 2007.

//! Seeded k-means clustering over sampled colors.
//!
//! [`cluster`] is deterministic: the same samples, `k`, and seed always give the same [`Clusters`].

use crate::MAX_K;

use std::array;

use palette::Srgb;
use rand::{prelude::Distribution, SeedableRng};
use rand_distr::{weighted_alias::WeightedAliasIndex, Uniform};
use rand_xoshiro::Xoroshiro128PlusPlus;
use wide::{f32x8, CmpLt};

/// The maximum number of assignment/update rounds performed by [`cluster`].
pub const MAX_ITERATIONS: u32 = 100;

/// The result of one clustering run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clusters {
    /// The mean color of each cluster.
    ///
    /// The centroids are not guaranteed to be unique.
    pub centroids: Vec<[f64; 3]>,
    /// The number of samples assigned to each cluster.
    ///
    /// Each count is not guaranteed to be non-zero.
    pub counts: Vec<u32>,
    /// The cluster index of each sample, in sample order.
    pub assignments: Vec<u32>,
}

impl Clusters {
    /// The number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    /// Whether there are no clusters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// The proportion of all samples assigned to each cluster.
    #[must_use]
    pub fn ratios(&self) -> Vec<f64> {
        #[allow(clippy::cast_precision_loss)]
        let total = self.assignments.len() as f64;
        self.counts
            .iter()
            .map(|&count| f64::from(count) / total)
            .collect()
    }
}

#[inline]
fn squared_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d = array::from_fn::<_, 3, _>(|i| a[i] - b[i]);
    d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
}

/// Packs the centroids into SIMD lanes, 8 centroids per chunk.
///
/// Unused lanes of the last chunk are set to infinity so they are never the nearest centroid.
#[allow(clippy::cast_possible_truncation)]
fn pack_centroids(centroids: &[[f64; 3]]) -> Vec<[f32x8; 3]> {
    let mut lanes = Vec::with_capacity(centroids.len().div_ceil(8));
    let chunks = centroids.chunks_exact(8);
    lanes.extend(
        chunks
            .clone()
            .map(|chunk| array::from_fn(|c| f32x8::new(array::from_fn(|j| chunk[j][c] as f32)))),
    );

    if !chunks.remainder().is_empty() {
        let mut arr = [[f32::INFINITY; 8]; 3];
        for (i, centroid) in chunks.remainder().iter().enumerate() {
            for (arr, &c) in arr.iter_mut().zip(centroid) {
                arr[i] = c as f32;
            }
        }
        lanes.push(arr.map(f32x8::new));
    }

    lanes
}

/// Returns the index of the centroid nearest to `query`.
///
/// Among equally near centroids, the one with the lowest index wins.
#[inline]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]
fn simd_argmin(lanes: &[[f32x8; 3]], query: [f32; 3]) -> u32 {
    let incr = f32x8::ONE;
    let mut cur_chunk = f32x8::ZERO;
    let mut min_chunk = cur_chunk;
    let mut min_distance = f32x8::splat(f32::INFINITY);

    let query = query.map(f32x8::splat);

    for chunk in lanes {
        let diff = array::from_fn::<_, 3, _>(|i| query[i] - chunk[i]);
        let distance = diff[0] * diff[0] + diff[1] * diff[1] + diff[2] * diff[2];

        let mask = distance.cmp_lt(min_distance);
        min_chunk = mask.blend(cur_chunk, min_chunk);
        min_distance = mask.blend(distance, min_distance);
        cur_chunk = cur_chunk + incr;
    }

    let mut min_lane = 0;
    let mut min_dist = f32::INFINITY;
    let chunks = min_chunk.as_array_ref();
    for (i, &v) in min_distance.as_array_ref().iter().enumerate() {
        // lanes are interleaved, so compare (distance, index) to keep the lowest index on ties
        if v < min_dist || (v == min_dist && chunks[i] < chunks[min_lane]) {
            min_dist = v;
            min_lane = i;
        }
    }

    chunks[min_lane] as u32 * 8 + min_lane as u32
}

/// Picks `k` initial centroids from `points` with k-means++ seeding.
///
/// Once every point coincides with a chosen centroid,
/// the remaining centroids are drawn uniformly and so are duplicates.
fn seed_centroids(points: &[[f32; 3]], k: usize, rng: &mut Xoroshiro128PlusPlus) -> Vec<[f64; 3]> {
    let uniform = Uniform::new(0, points.len());
    let mut centroids = Vec::with_capacity(k);

    let first = points[uniform.sample(rng)];
    centroids.push(first.map(f64::from));

    let mut distances = points
        .iter()
        .map(|&p| f64::from(squared_distance(p, first)))
        .collect::<Vec<_>>();

    while centroids.len() < k {
        let next = match WeightedAliasIndex::new(distances.clone()) {
            Ok(weighted) => points[weighted.sample(rng)],
            Err(_) => points[uniform.sample(rng)], // all weights are zero
        };

        for (distance, &p) in distances.iter_mut().zip(points) {
            *distance = distance.min(f64::from(squared_distance(p, next)));
        }

        centroids.push(next.map(f64::from));
    }

    centroids
}

/// Partitions `samples` into exactly `k` clusters, with `k` capped at [`MAX_K`].
///
/// Clustering never fails: if there are fewer distinct samples than `k`,
/// some of the returned centroids are duplicates and may have a count of zero.
/// An empty [`Clusters`] is returned only if `samples` is empty or `k` is `0`.
///
/// # Examples
/// ```
/// # use chromapick::kmeans::cluster;
/// # use palette::Srgb;
/// let samples = [Srgb::new(255, 0, 0), Srgb::new(250, 0, 0), Srgb::new(0, 0, 255)];
/// let clusters = cluster(&samples, 2, 42);
///
/// assert_eq!(clusters.len(), 2);
/// assert_eq!(clusters.counts.iter().sum::<u32>(), 3);
/// ```
#[must_use]
pub fn cluster(samples: &[Srgb<u8>], k: u32, seed: u64) -> Clusters {
    if samples.is_empty() || k == 0 {
        return Clusters::default();
    }

    let k = k.min(MAX_K) as usize;
    let points = samples
        .iter()
        .map(|&c| {
            let (r, g, b) = c.into_components();
            [r, g, b].map(f32::from)
        })
        .collect::<Vec<_>>();

    let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(seed);
    let mut centroids = seed_centroids(&points, k, rng);

    let mut assignments = vec![u32::MAX; points.len()];
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS {
        iterations += 1;

        let lanes = pack_centroids(&centroids);
        let mut changed = false;
        for (assignment, &point) in assignments.iter_mut().zip(&points) {
            let nearest = simd_argmin(&lanes, point);
            if *assignment != nearest {
                *assignment = nearest;
                changed = true;
            }
        }

        if !changed {
            break;
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0u32; k];
        for (&assignment, point) in assignments.iter().zip(&points) {
            let i = assignment as usize;
            for (s, &c) in sums[i].iter_mut().zip(point) {
                *s += f64::from(c);
            }
            counts[i] += 1;
        }

        // empty clusters keep their previous centroid
        for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
            if count > 0 {
                *centroid = sum.map(|s| s / f64::from(count));
            }
        }
    }

    let mut counts = vec![0u32; k];
    for &assignment in &assignments {
        counts[assignment as usize] += 1;
    }

    log::trace!("k-means converged after {iterations} iterations, counts: {counts:?}");

    Clusters { centroids, counts, assignments }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn srgb_samples(data: &[u8]) -> Vec<Srgb<u8>> {
        data.chunks_exact(4)
            .map(|p| Srgb::new(p[0], p[1], p[2]))
            .collect()
    }

    fn naive_argmin(centroids: &[[f64; 3]], query: [f32; 3]) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let distances = centroids
            .iter()
            .map(|c| squared_distance(c.map(|v| v as f32), query))
            .collect::<Vec<_>>();

        let mut min = 0;
        for (i, &d) in distances.iter().enumerate() {
            if d < distances[min] {
                min = i;
            }
        }
        u32::try_from(min).unwrap()
    }

    #[test]
    fn simd_argmin_matches_naive() {
        // use a non-multiple of 8 to test remainder handling
        let centroids = srgb_samples(&noise_image(19, 1, 1))
            .into_iter()
            .map(|c| {
                let (r, g, b) = c.into_components();
                [r, g, b].map(f64::from)
            })
            .collect::<Vec<_>>();

        let lanes = pack_centroids(&centroids);

        for query in srgb_samples(&noise_image(64, 16, 2)) {
            let (r, g, b) = query.into_components();
            let query = [r, g, b].map(f32::from);
            assert_eq!(simd_argmin(&lanes, query), naive_argmin(&centroids, query));
        }
    }

    #[test]
    fn simd_argmin_prefers_lowest_index() {
        let centroids = vec![[10.0, 10.0, 10.0]; 11];
        let lanes = pack_centroids(&centroids);
        assert_eq!(simd_argmin(&lanes, [10.0, 10.0, 10.0]), 0);
    }

    #[test]
    fn empty_input() {
        assert_eq!(cluster(&[], 4, 42), Clusters::default());
        assert_eq!(cluster(&[Srgb::new(1, 2, 3)], 0, 42), Clusters::default());
    }

    #[test]
    fn fewer_distinct_colors_than_k() {
        let samples = vec![Srgb::new(255, 0, 0); 4];
        let clusters = cluster(&samples, 3, 42);

        assert_eq!(clusters.len(), 3);
        assert!(clusters.centroids.iter().all(|&c| c == [255.0, 0.0, 0.0]));
        assert_eq!(clusters.counts, [4, 0, 0]);
        assert_eq!(clusters.assignments, [0, 0, 0, 0]);
    }

    #[test]
    fn k_is_capped() {
        let samples = srgb_samples(&solid_image(2, 2, RED));
        let clusters = cluster(&samples, u32::MAX, 42);
        assert_eq!(clusters.len(), MAX_K as usize);
        assert_eq!(clusters.counts[0], 4);
    }

    #[test]
    fn separates_distinct_regions() {
        let samples = srgb_samples(&quadrant_image(8, 8));
        let clusters = cluster(&samples, 4, 42);

        let mut centroids = clusters.centroids.clone();
        centroids.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            centroids,
            [
                [0.0, 0.0, 255.0],
                [0.0, 255.0, 0.0],
                [255.0, 0.0, 0.0],
                [255.0, 255.0, 255.0],
            ]
        );
        assert_eq!(clusters.counts, [16; 4]);
    }

    #[test]
    fn counts_match_assignments() {
        let samples = srgb_samples(&noise_image(40, 40, 5));
        let clusters = cluster(&samples, 10, 42);

        let mut counts = vec![0; clusters.len()];
        for &i in &clusters.assignments {
            counts[i as usize] += 1;
        }
        assert_eq!(counts, clusters.counts);
        assert_eq!(clusters.assignments.len(), samples.len());
        assert!(clusters.centroids.iter().flatten().all(|c| c.is_finite()));
    }

    #[test]
    fn ratios_sum_to_one() {
        let samples = srgb_samples(&noise_image(32, 32, 9));
        let ratios = cluster(&samples, 6, 42).ratios();
        assert_eq!(ratios.len(), 6);
        assert!((ratios.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_result() {
        let samples = srgb_samples(&noise_image(50, 30, 11));
        assert_eq!(cluster(&samples, 8, 42), cluster(&samples, 8, 42));
    }
}
