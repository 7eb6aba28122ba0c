//! Aggregation of the colors from all clustering runs.

use crate::Color;

use std::collections::{hash_map::Entry, HashMap};

/// A color group under construction.
struct Group {
    color: Color,
    ratio_sum: f64,
    count: u32,
}

/// Groups `colors` by exact key and averages the ratios of each group.
///
/// A missing ratio counts as `0`. Every returned color has a ratio equal to
/// the sum of its group's ratios divided by the group's size.
/// Groups are returned in the order their keys were first seen, and each group keeps the
/// rounded color and centroid value of its first member.
///
/// The content of the result does not depend on input order; only the order of the groups does.
#[must_use]
pub fn stabilize(colors: impl IntoIterator<Item = Color>) -> Vec<Color> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for color in colors {
        let ratio = color.ratio.unwrap_or(0.0);
        match index.entry(color.key.clone()) {
            Entry::Occupied(entry) => {
                let group = &mut groups[*entry.get()];
                group.ratio_sum += ratio;
                group.count += 1;
            }
            Entry::Vacant(entry) => {
                entry.insert(groups.len());
                groups.push(Group { color, ratio_sum: ratio, count: 1 });
            }
        }
    }

    groups
        .into_iter()
        .map(|Group { color, ratio_sum, count }| Color {
            ratio: Some(ratio_sum / f64::from(count)),
            ..color
        })
        .collect()
}
