//! Cross track error estimation.
//!
//! The waypoints just ahead of the vehicle are transformed into the vehicle's
//! frame and a cubic `y = f(x)` is fitted through them. The fitted curve's
//! value at `x = 0` is the lateral offset of the path from the vehicle, which
//! a steering controller uses as its feedback term. A positive value means the
//! path lies to the vehicle's left.

use crate::error::FitError;
use crate::math::CubicFn;
use crate::path::Path;
use crate::vehicle::VehicleState;

/// Estimates the cross track error using `count` waypoints from the nearest one ahead of the vehicle.
pub fn estimate(path: &Path, vehicle: &VehicleState, count: usize) -> Result<f64, FitError> {
    estimate_from(path, vehicle, path.closest_ahead(vehicle), count)
}

/// Estimates the cross track error using `count` waypoints starting at `start`.
pub fn estimate_from(
    path: &Path,
    vehicle: &VehicleState,
    start: usize,
    count: usize,
) -> Result<f64, FitError> {
    let points: Vec<_> = path
        .indices_from(start, count)
        .map(|idx| {
            let local = vehicle.to_local(path.get(idx).position);
            (local.x, local.y)
        })
        .collect();
    let curve = CubicFn::least_squares(&points)?;
    Ok(curve.y(0.0))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point2d;
    use crate::path::Waypoint;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::TAU;

    fn path_from(points: impl Iterator<Item = (f64, f64)>) -> Path {
        Path::new(
            points
                .map(|(x, y)| Waypoint::new(Point2d::new(x, y), 0.0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn offset_from_straight_path() {
        let path = path_from((0..50).map(|i| (i as f64, 0.0)));

        let vehicle = VehicleState::new(Point2d::new(5.5, 1.0), 0.0, 10.0);
        assert_approx_eq!(estimate(&path, &vehicle, 10).unwrap(), -1.0, 1e-6);

        let vehicle = VehicleState::new(Point2d::new(5.5, -0.5), 0.0, 10.0);
        assert_approx_eq!(estimate(&path, &vehicle, 10).unwrap(), 0.5, 1e-6);
    }

    #[test]
    fn on_curved_path() {
        let path = path_from((0..300).map(|i| {
            let angle = TAU * i as f64 / 300.0;
            (50.0 * angle.cos(), 50.0 * angle.sin())
        }));

        let angle: f64 = 0.3;
        let position = Point2d::new(50.0 * angle.cos(), 50.0 * angle.sin());
        let vehicle = VehicleState::new(position, angle + TAU / 4.0, 10.0);
        assert_approx_eq!(estimate(&path, &vehicle, 10).unwrap(), 0.0, 0.01);

        // Outside the circle, the path is to the left
        let position = Point2d::new(51.0 * angle.cos(), 51.0 * angle.sin());
        let vehicle = VehicleState::new(position, angle + TAU / 4.0, 10.0);
        assert_approx_eq!(estimate(&path, &vehicle, 10).unwrap(), 1.0, 0.01);
    }

    #[test]
    fn degenerate_lookahead() {
        let path = path_from((0..50).map(|i| (i as f64, 0.0)));
        let vehicle = VehicleState::new(Point2d::new(5.5, 1.0), 0.0, 10.0);
        assert_eq!(
            estimate(&path, &vehicle, 3),
            Err(FitError::TooFewPoints { count: 3 })
        );

        let stacked = path_from((0..8).map(|i| (3.0, 0.001 * i as f64)));
        let vehicle = VehicleState::new(Point2d::new(0.0, 0.0), 0.0, 10.0);
        assert!(matches!(
            estimate(&stacked, &vehicle, 6),
            Err(FitError::Degenerate { .. })
        ));
    }
}
