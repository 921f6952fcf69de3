//! Ordered, pairwise-disjoint list of free intervals on a cycle.

use serde::{Deserialize, Serialize};

/// A free interval `[start, start + length)`. Serialized as `[start, length]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct FreeSpace {
    /// First free tick.
    pub start: u32,
    /// Number of free ticks.
    pub length: u32,
}

impl FreeSpace {
    /// Create an interval.
    #[must_use]
    pub const fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    /// One past the last free tick.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.start + self.length
    }

    /// Whether `[at, at + len)` lies inside this interval.
    #[must_use]
    pub const fn contains_range(&self, at: u32, len: u32) -> bool {
        self.start <= at && at + len <= self.end()
    }
}

impl From<(u32, u32)> for FreeSpace {
    fn from((start, length): (u32, u32)) -> Self {
        Self { start, length }
    }
}

impl From<FreeSpace> for (u32, u32) {
    fn from(space: FreeSpace) -> Self {
        (space.start, space.length)
    }
}

/// Free intervals sorted by start, never overlapping or touching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FreeList {
    spaces: Vec<FreeSpace>,
}

impl FreeList {
    /// A single interval covering the whole cycle.
    #[must_use]
    pub fn full(cycle_length: u32) -> Self {
        let spaces = if cycle_length == 0 {
            Vec::new()
        } else {
            vec![FreeSpace::new(0, cycle_length)]
        };
        Self { spaces }
    }

    /// Build from raw intervals, sorting and merging as needed.
    #[must_use]
    pub fn from_spaces(mut spaces: Vec<FreeSpace>) -> Self {
        spaces.retain(|s| s.length > 0);
        spaces.sort_by_key(|s| s.start);
        let mut list = Self { spaces: Vec::with_capacity(spaces.len()) };
        for space in spaces {
            list.release(space.start, space.length);
        }
        list
    }

    /// Intervals in order.
    #[must_use]
    pub fn as_slice(&self) -> &[FreeSpace] {
        &self.spaces
    }

    /// Sum of interval lengths.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.spaces.iter().map(|s| s.length).sum()
    }

    /// Number of intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    /// Whether nothing is free.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// Whether the list is sorted and pairwise disjoint.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.spaces.iter().all(|s| s.length > 0)
            && self.spaces.windows(2).all(|w| w[0].end() <= w[1].start)
    }

    /// First interval (from the start) matching `pred`.
    pub fn position(&self, pred: impl Fn(&FreeSpace) -> bool) -> Option<usize> {
        self.spaces.iter().position(pred)
    }

    /// Last interval (scanning from the end) matching `pred`.
    pub fn rposition(&self, pred: impl Fn(&FreeSpace) -> bool) -> Option<usize> {
        self.spaces.iter().rposition(pred)
    }

    /// Interval at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<FreeSpace> {
        self.spaces.get(index).copied()
    }

    /// Remove `[at, at + len)` from the interval at `index`, leaving zero, one or two
    /// remainders. Returns `false` (and changes nothing) if the range does not fit.
    pub fn carve(&mut self, index: usize, at: u32, len: u32) -> bool {
        let Some(space) = self.get(index) else {
            return false;
        };
        if len == 0 || !space.contains_range(at, len) {
            return false;
        }
        let before = FreeSpace::new(space.start, at - space.start);
        let after = FreeSpace::new(at + len, space.end() - (at + len));
        let pieces: Vec<FreeSpace> = [before, after].into_iter().filter(|s| s.length > 0).collect();
        self.spaces.splice(index..=index, pieces);
        true
    }

    /// Give `[at, at + len)` back, merging with touching neighbours.
    ///
    /// The range must not overlap an existing free interval.
    pub fn release(&mut self, at: u32, len: u32) {
        if len == 0 {
            return;
        }
        let index = self.spaces.partition_point(|s| s.start < at);
        let mut merged = FreeSpace::new(at, len);
        let mut remove_from = index;
        let mut remove_to = index;
        if index > 0 && self.spaces[index - 1].end() == at {
            merged.start = self.spaces[index - 1].start;
            merged.length += self.spaces[index - 1].length;
            remove_from = index - 1;
        }
        if index < self.spaces.len() && self.spaces[index].start == at + len {
            merged.length += self.spaces[index].length;
            remove_to = index + 1;
        }
        self.spaces.splice(remove_from..remove_to, [merged]);
    }
}
