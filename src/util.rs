//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> Interval<T> {
    /// Restricts a value to lie within the interval.
    pub fn clamp(&self, value: T) -> T {
        value.max(self.min).min(self.max)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// Yields `take` consecutive indices into a circular sequence of length `len`,
/// starting at `start` and wrapping back to zero as many times as needed.
pub fn wrapping_range(len: usize, start: usize, take: usize) -> impl Iterator<Item = usize> {
    (0..take).map(move |i| (start + i) % len)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clamp_to_interval() {
        let range = Interval::new(0.0, 4.0);
        assert_eq!(range.clamp(-1.0), 0.0);
        assert_eq!(range.clamp(2.5), 2.5);
        assert_eq!(range.clamp(9.0), 4.0);
        assert!(range.contains(4.0));
        assert_eq!(range.length(), 4.0);
    }

    #[test]
    fn wrapping_range_wraps() {
        let idxs: Vec<_> = wrapping_range(4, 2, 7).collect();
        assert_eq!(idxs, vec![2, 3, 0, 1, 2, 3, 0]);
    }
}
