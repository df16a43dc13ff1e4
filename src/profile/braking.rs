use super::VelocityProfile;

/// Floor on the stopping distance, to avoid dividing by zero.
const MIN_STOP_DIST: f64 = 1e-3; // m

/// Brakes at a constant rate so the vehicle comes to rest before a stop line.
///
/// The deceleration is the minimum needed to stop within the given distance,
/// scaled up by an overshoot margin, so the vehicle reaches zero speed at
/// `distance / margin` and holds it until the stop line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrakingProfile {
    start_vel: f64,
    distance: f64,
    acc: f64,
}

impl BrakingProfile {
    /// Creates a new braking profile.
    ///
    /// # Parameters
    /// * `start_vel` - The velocity when braking begins in m/s
    /// * `distance` - The distance to the stop line in m
    /// * `margin` - The factor by which to brake harder than strictly necessary
    pub fn new(start_vel: f64, distance: f64, margin: f64) -> Self {
        let acc = -0.5 * start_vel.powi(2) / f64::max(MIN_STOP_DIST, distance) * margin;
        Self {
            start_vel,
            distance,
            acc,
        }
    }

    /// The constant acceleration of the profile, a negative number in m/s^2.
    pub fn acceleration(&self) -> f64 {
        self.acc
    }
}

impl VelocityProfile for BrakingProfile {
    fn velocity_at(&self, dist: f64) -> f64 {
        if dist >= self.distance {
            return 0.0;
        }
        let dist = f64::max(dist, 0.0);
        f64::max(0.0, 2.0 * self.acc * dist + self.start_vel.powi(2)).sqrt()
    }

    fn span(&self) -> f64 {
        self.distance
    }
}
