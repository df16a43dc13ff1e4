//! Velocity profiles, which map the distance travelled along the path to a target speed.

pub use braking::BrakingProfile;
pub use cruise::CruiseProfile;

mod braking;
mod cruise;

/// A target speed as a function of the distance travelled since the profile began.
pub trait VelocityProfile {
    /// The target speed in m/s after travelling `dist` metres.
    fn velocity_at(&self, dist: f64) -> f64;

    /// The distance at which the profile reaches its terminal speed.
    fn span(&self) -> f64;

    /// Whether the profile has nothing left to do after travelling `dist` metres.
    fn is_exhausted(&self, dist: f64) -> bool {
        dist >= self.span()
    }
}

/// The profile currently driving the vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Profile {
    Cruise(CruiseProfile),
    Braking(BrakingProfile),
}

impl VelocityProfile for Profile {
    fn velocity_at(&self, dist: f64) -> f64 {
        match self {
            Profile::Cruise(p) => p.velocity_at(dist),
            Profile::Braking(p) => p.velocity_at(dist),
        }
    }

    fn span(&self) -> f64 {
        match self {
            Profile::Cruise(p) => p.span(),
            Profile::Braking(p) => p.span(),
        }
    }
}
