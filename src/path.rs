use crate::error::PathError;
use crate::math::{distance, Point2d};
use crate::util::wrapping_range;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

mod localize;

/// A single point on the route.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// The world space coordinates of the waypoint.
    pub position: Point2d,
    /// The target speed at the waypoint in m/s.
    pub speed: f64,
}

impl Waypoint {
    /// Creates a new waypoint.
    pub fn new(position: Point2d, speed: f64) -> Self {
        Self { position, speed }
    }
}

/// A closed route, made up of waypoints joined in sequence.
///
/// Indices wrap around modulo the number of waypoints, so the last waypoint is
/// followed by the first. A path always has at least two waypoints and is never
/// edited once created; a new route replaces it wholesale.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

impl Path {
    /// Creates a new path from an ordered sequence of waypoints.
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, PathError> {
        if waypoints.len() < 2 {
            return Err(PathError::TooShort {
                len: waypoints.len(),
            });
        }
        Ok(Self { waypoints })
    }

    /// The number of waypoints in the path.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false, as a path has at least two waypoints.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The waypoints in route order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Gets the waypoint at the given index, wrapping around the end of the path.
    pub fn get(&self, idx: usize) -> &Waypoint {
        &self.waypoints[self.wrap(idx)]
    }

    /// Normalises an index into the range of valid indices.
    pub fn wrap(&self, idx: usize) -> usize {
        idx % self.len()
    }

    /// The number of steps needed to walk forward from `from` to `to`.
    pub fn forward_offset(&self, from: usize, to: usize) -> usize {
        let len = self.len();
        (self.wrap(to) + len - self.wrap(from)) % len
    }

    /// Iterates over `take` consecutive indices beginning at `start`.
    pub fn indices_from(&self, start: usize, take: usize) -> impl Iterator<Item = usize> {
        wrapping_range(self.len(), self.wrap(start), take)
    }

    /// The distance travelled along the path walking forward from waypoint `from` to waypoint `to`.
    ///
    /// Walking past the last waypoint continues from the first, so the distance
    /// between indices on either side of the seam is the distance around the join.
    pub fn arc_length(&self, from: usize, to: usize) -> f64 {
        let steps = self.forward_offset(from, to);
        self.indices_from(from, steps + 1)
            .map(|idx| self.waypoints[idx].position)
            .tuple_windows()
            .map(|(a, b)| distance(a, b))
            .sum()
    }
}
