use super::VelocityProfile;
use crate::math::CubicFn;
use crate::util::Interval;

/// Smoothly changes speed from a start velocity to a target velocity, then holds it.
///
/// The transition is a cubic with zero slope at both ends, so switching into or
/// out of the profile does not introduce a step in acceleration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CruiseProfile {
    curve: CubicFn,
    range: Interval<f64>,
    target: f64,
}

impl CruiseProfile {
    /// Creates a new cruise profile.
    ///
    /// # Parameters
    /// * `start_vel` - The velocity at the start of the profile in m/s
    /// * `target_vel` - The velocity to settle at in m/s
    /// * `duration` - The length of the transition in m
    pub fn new(start_vel: f64, target_vel: f64, duration: f64) -> Self {
        let duration = f64::max(duration, f64::EPSILON);
        Self {
            curve: CubicFn::from_ends(0.0, start_vel, duration, target_vel),
            range: Interval::new(0.0, duration),
            target: target_vel,
        }
    }

    /// The velocity this profile settles at.
    pub fn target(&self) -> f64 {
        self.target
    }
}

impl VelocityProfile for CruiseProfile {
    fn velocity_at(&self, dist: f64) -> f64 {
        if dist >= self.range.max {
            return self.target;
        }
        f64::max(self.curve.y(self.range.clamp(dist)), 0.0)
    }

    fn span(&self) -> f64 {
        self.range.length()
    }
}
