use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// A point expressed in a vehicle's local coordinate frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalPoint {
    /// Distance ahead of the vehicle, in m.
    pub x: f64,
    /// Distance to the left of the vehicle, in m.
    pub y: f64,
    /// The angle of the point relative to the vehicle's heading, in radians.
    pub bearing: f64,
}

/// The Euclidean distance between two points.
pub fn distance(p1: Point2d, p2: Point2d) -> f64 {
    p1.distance(p2)
}

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Transforms a global point into the frame of a body at `origin` facing `yaw`.
///
/// The point is translated by `-origin` and then rotated by `-yaw`.
pub fn to_local_frame(origin: Point2d, yaw: f64, point: Point2d) -> LocalPoint {
    let x_axis = Vector2d::new(yaw.cos(), yaw.sin());
    let local = project_local(point, origin, x_axis, rot90(x_axis));
    LocalPoint {
        x: local.x,
        y: local.y,
        bearing: local.y.atan2(local.x),
    }
}

/// Rotates a vector 90 degrees anticlockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn distance_is_euclidean() {
        let d = distance(Point2d::new(1.0, 1.0), Point2d::new(4.0, 5.0));
        assert_approx_eq!(d, 5.0);
    }

    #[test]
    fn local_frame_facing_north() {
        let local = to_local_frame(Point2d::new(10.0, 10.0), FRAC_PI_2, Point2d::new(10.0, 15.0));
        assert_approx_eq!(local.x, 5.0);
        assert_approx_eq!(local.y, 0.0);
        assert_approx_eq!(local.bearing, 0.0);

        let local = to_local_frame(Point2d::new(10.0, 10.0), FRAC_PI_2, Point2d::new(7.0, 10.0));
        assert_approx_eq!(local.x, 0.0);
        assert_approx_eq!(local.y, 3.0);
        assert_approx_eq!(local.bearing, FRAC_PI_2);
    }

    #[test]
    fn local_frame_behind() {
        let local = to_local_frame(Point2d::new(0.0, 0.0), 0.0, Point2d::new(-2.0, 0.0));
        assert!(local.x < 0.0);
        assert_approx_eq!(local.bearing.abs(), std::f64::consts::PI);
    }
}
