//! Key-space regions
//!
//! Namespaces are sharded by contiguous ranges of the byte-string key space.
//! A [`Region`] is the half-open range `[left, right)`; `right = None` means
//! the range is unbounded above. [`Region::universe`] covers every key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Half-open key range `[left, right)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Region {
    /// Inclusive lower bound
    pub left: Vec<u8>,
    /// Exclusive upper bound, `None` for unbounded
    pub right: Option<Vec<u8>>,
}

impl Region {
    /// Range `[left, right)`.
    pub fn new(left: impl Into<Vec<u8>>, right: Option<Vec<u8>>) -> Self {
        Self {
            left: left.into(),
            right,
        }
    }

    /// Range `[left, right)` with both bounds given.
    pub fn bounded(left: impl Into<Vec<u8>>, right: impl Into<Vec<u8>>) -> Self {
        Self::new(left, Some(right.into()))
    }

    /// The whole key space.
    pub fn universe() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Whether this is the whole key space.
    pub fn is_universe(&self) -> bool {
        self.left.is_empty() && self.right.is_none()
    }

    /// Whether no key falls in the range.
    pub fn is_empty(&self) -> bool {
        matches!(&self.right, Some(right) if *right <= self.left)
    }

    /// Whether `key` falls in the range.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        key >= self.left.as_slice() && self.right.as_deref().map_or(true, |right| key < right)
    }

    /// Largest range contained in both.
    pub fn intersection(&self, other: &Self) -> Self {
        let left = self.left.clone().max(other.left.clone());
        let right = match (&self.right, &other.right) {
            (None, None) => None,
            (Some(r), None) | (None, Some(r)) => Some(r.clone()),
            (Some(a), Some(b)) => Some(a.clone().min(b.clone())),
        };
        Self { left, right }
    }

    /// Whether some key falls in both ranges.
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.is_empty() && !other.is_empty() && !self.intersection(other).is_empty()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.right {
            Some(right) => write!(f, "[{}, {})", hex::encode(&self.left), hex::encode(right)),
            None => write!(f, "[{}, +inf)", hex::encode(&self.left)),
        }
    }
}

/// Whether `shards` covers the whole key space with no gaps or overlaps.
///
/// Writers check this before advancing a namespace's `shards` field. Joins
/// never do: a merged record may transiently hold a set that fails it.
pub fn shards_partition_universe(shards: &BTreeSet<Region>) -> bool {
    let mut expected_left: Option<&[u8]> = Some(&[]);
    for shard in shards {
        if shard.is_empty() {
            return false;
        }
        match expected_left {
            Some(left) if left == shard.left.as_slice() => {
                expected_left = shard.right.as_deref();
            }
            _ => return false,
        }
    }
    !shards.is_empty() && expected_left.is_none()
}

/// Assignment of a value to each of a set of disjoint regions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionMap<V> {
    pairs: Vec<(Region, V)>,
}

impl<V> RegionMap<V> {
    /// Map assigning `value` to all of `region`.
    pub fn new(region: Region, value: V) -> Self {
        Self {
            pairs: vec![(region, value)],
        }
    }

    /// Map from explicit pairs, ordered by region.
    pub fn from_pairs(mut pairs: Vec<(Region, V)>) -> Self {
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Self { pairs }
    }

    /// Value for the region containing `key`.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.pairs
            .iter()
            .find(|(region, _)| region.contains_key(key))
            .map(|(_, value)| value)
    }

    /// Value assigned to exactly `region`.
    pub fn get_region(&self, region: &Region) -> Option<&V> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == region)
            .map(|(_, value)| value)
    }

    /// Regions in order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.pairs.iter().map(|(region, _)| region)
    }

    /// Region/value pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Region, &V)> {
        self.pairs.iter().map(|(region, value)| (region, value))
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no region is assigned.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
