//! Conversion of a desired yaw rate into a steering wheel angle.
//!
//! Uses a single track (bicycle) model of the vehicle: a vehicle with wheel base
//! `L` following a circle of radius `R` has a road wheel angle of `atan(L / R)`,
//! which is scaled by the steering ratio to give the steering wheel angle.

use serde::Deserialize;

/// Speeds at or below this, in m/s, produce no steering.
const MIN_STEER_SPEED: f64 = 0.1;

/// The physical and safety limits of the vehicle's steering.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SteeringParams {
    /// The distance between the front and rear axles in m.
    pub wheel_base: f64,
    /// The ratio of steering wheel angle to road wheel angle.
    pub steer_ratio: f64,
    /// The speed in m/s used for the turning radius when driving slower than it.
    pub min_speed: f64,
    /// The maximum lateral acceleration in m/s^2.
    pub max_lat_accel: f64,
    /// The maximum steering wheel angle in radians.
    pub max_steer_angle: f64,
}

/// Converts desired linear and angular velocities into a steering angle.
#[derive(Debug, Clone, Copy)]
pub struct YawController {
    params: SteeringParams,
}

impl YawController {
    /// Creates a new yaw controller.
    pub fn new(params: SteeringParams) -> Self {
        Self { params }
    }

    /// The controller's parameters.
    pub fn params(&self) -> &SteeringParams {
        &self.params
    }

    /// Computes the steering wheel angle for a desired motion.
    ///
    /// # Parameters
    /// * `linear_vel` - The desired linear velocity in m/s
    /// * `angular_vel` - The desired angular velocity in rad/s
    /// * `current_vel` - The vehicle's current speed in m/s
    pub fn steering(&self, linear_vel: f64, angular_vel: f64, current_vel: f64) -> f64 {
        if linear_vel.abs() <= f64::EPSILON {
            return 0.0;
        }

        // Keep the commanded curvature at the actual speed
        let angular_vel = current_vel * angular_vel / linear_vel;

        if current_vel.abs() <= MIN_STEER_SPEED {
            return 0.0;
        }
        let max_yaw_rate = (self.params.max_lat_accel / current_vel).abs();
        let angular_vel = angular_vel.clamp(-max_yaw_rate, max_yaw_rate);

        if angular_vel == 0.0 {
            return 0.0;
        }
        let radius = f64::max(current_vel, self.params.min_speed) / angular_vel;
        self.angle(radius)
    }

    /// The steering wheel angle needed to follow a circle of the given radius.
    fn angle(&self, radius: f64) -> f64 {
        let max = self.params.max_steer_angle;
        let angle = (self.params.wheel_base / radius).atan() * self.params.steer_ratio;
        angle.clamp(-max, max)
    }
}

/// Computes a steering angle without constructing a [YawController].
#[allow(clippy::too_many_arguments)]
pub fn compute_angle(
    wheel_base: f64,
    steer_ratio: f64,
    min_speed: f64,
    max_lat_accel: f64,
    max_steer_angle: f64,
    linear_vel: f64,
    angular_vel: f64,
    current_vel: f64,
) -> f64 {
    YawController::new(SteeringParams {
        wheel_base,
        steer_ratio,
        min_speed,
        max_lat_accel,
        max_steer_angle,
    })
    .steering(linear_vel, angular_vel, current_vel)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    const PARAMS: SteeringParams = SteeringParams {
        wheel_base: 2.8,
        steer_ratio: 14.8,
        min_speed: 5.0,
        max_lat_accel: 3.0,
        max_steer_angle: 8.0,
    };

    #[test]
    fn zero_linear_velocity() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        let controller = YawController::new(PARAMS);
        for _ in 0..100 {
            let angular = rng.gen_range(-5.0..5.0);
            let current = rng.gen_range(-30.0..30.0);
            assert_eq!(controller.steering(0.0, angular, current), 0.0);
        }
    }

    #[test]
    fn bounded_angle() {
        let angle = compute_angle(2.8, 14.8, 5.0, 3.0, 8.0, 5.0, 1.0, 5.0);
        assert!(angle.is_finite());
        assert!(angle.abs() <= 8.0);
        // Yaw rate limited to 3 / 5 rad/s
        assert_approx_eq!(angle, (2.8_f64 / (5.0 / 0.6)).atan() * 14.8);
    }

    #[test]
    fn stationary_vehicle() {
        let controller = YawController::new(PARAMS);
        assert_eq!(controller.steering(5.0, 1.0, 0.05), 0.0);
        assert_eq!(controller.steering(5.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn turns_towards_angular_velocity() {
        let controller = YawController::new(PARAMS);
        let left = controller.steering(10.0, 0.1, 10.0);
        let right = controller.steering(10.0, -0.1, 10.0);
        assert!(left > 0.0);
        assert_approx_eq!(left, -right);
        assert_approx_eq!(left, (2.8f64 / 100.0).atan() * 14.8);
    }

    #[test]
    fn saturates() {
        let params = SteeringParams {
            max_lat_accel: 100.0,
            max_steer_angle: 1.0,
            ..PARAMS
        };
        let controller = YawController::new(params);
        assert_eq!(controller.steering(5.0, 3.0, 5.0), 1.0);
        assert_eq!(controller.steering(5.0, -3.0, 5.0), -1.0);
    }
}
