use crate::math::{to_local_frame, LocalPoint, Point2d, Vector2d};
use cgmath::Quaternion;

/// Below this speed in m/s the vehicle is considered stopped.
const STOPPED_SPEED: f64 = 0.1;

/// A snapshot of the vehicle's kinematic state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleState {
    /// The world space coordinates of the vehicle.
    pub position: Point2d,
    /// The vehicle's heading, anticlockwise from the world x-axis in radians.
    pub yaw: f64,
    /// The longitudinal speed in m/s.
    pub speed: f64,
    /// The estimated longitudinal acceleration in m/s^2.
    pub acceleration: f64,
}

impl VehicleState {
    /// Creates a vehicle state with zero acceleration.
    pub fn new(position: Point2d, yaw: f64, speed: f64) -> Self {
        Self {
            position,
            yaw,
            speed,
            acceleration: 0.0,
        }
    }

    /// A unit vector in world space aligned with the vehicle's heading.
    pub fn direction(&self) -> Vector2d {
        Vector2d::new(self.yaw.cos(), self.yaw.sin())
    }

    /// Transforms a world space point into the vehicle's coordinate frame.
    pub fn to_local(&self, point: Point2d) -> LocalPoint {
        to_local_frame(self.position, self.yaw, point)
    }

    /// Whether the point lies strictly in front of the vehicle.
    pub fn is_ahead(&self, point: Point2d) -> bool {
        self.to_local(point).x > 0.0
    }

    /// Whether the vehicle is stopped.
    pub fn has_stopped(&self) -> bool {
        self.speed.abs() < STOPPED_SPEED
    }
}

/// Extracts the rotation about the vertical axis from an orientation quaternion.
pub fn yaw_from_quaternion(q: Quaternion<f64>) -> f64 {
    let (w, x, y, z) = (q.s, q.v.x, q.v.y, q.v.z);
    f64::atan2(2.0 * (w * z + x * y), 1.0 - 2.0 * (y * y + z * z))
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use cgmath::{Rad, Rotation3, Vector3};

    #[test]
    fn yaw_of_rotation_about_z() {
        for yaw in [-3.0, -1.2, 0.0, 0.4, 2.9] {
            let q = Quaternion::from_axis_angle(Vector3::unit_z(), Rad(yaw));
            assert_approx_eq!(yaw_from_quaternion(q), yaw);
        }
    }

    #[test]
    fn point_ahead() {
        let vehicle = VehicleState::new(Point2d::new(1.0, 1.0), std::f64::consts::PI, 5.0);
        assert!(vehicle.is_ahead(Point2d::new(0.0, 1.5)));
        assert!(!vehicle.is_ahead(Point2d::new(2.0, 1.0)));
        assert!(!vehicle.has_stopped());
    }
}
