use super::Path;
use crate::math::{distance, Point2d};
use crate::vehicle::VehicleState;

impl Path {
    /// Finds the index of the waypoint nearest to `point`.
    ///
    /// A linear scan; routes are at most a few thousand waypoints long.
    pub fn closest_to(&self, point: Point2d) -> usize {
        self.waypoints
            .iter()
            .map(|wp| distance(wp.position, point))
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    /// Finds the index of the nearest waypoint which is not behind the vehicle.
    ///
    /// If the nearest waypoint lies behind the vehicle, the waypoint after it is returned.
    pub fn closest_ahead(&self, vehicle: &VehicleState) -> usize {
        let closest = self.closest_to(vehicle.position);
        if vehicle.is_ahead(self.waypoints[closest].position) {
            closest
        } else {
            self.wrap(closest + 1)
        }
    }
}
