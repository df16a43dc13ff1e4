pub use cgmath;
pub use config::{ConfigError, LightConfig, PlannerConfig};
pub use control::{InputBuffer, Inputs, TickOutput, WaypointUpdater};
pub use error::{FitError, PathError};
pub use light::{LightColor, LightStateFilter, StopLineLocator};
pub use path::{Path, Waypoint};
pub use planner::{Planner, PlannerState, PlannerStateKind, StopRequest};
pub use profile::{BrakingProfile, CruiseProfile, Profile, VelocityProfile};
pub use steering::{compute_angle, SteeringParams, YawController};
pub use util::Interval;
pub use vehicle::{yaw_from_quaternion, VehicleState};

mod config;
mod control;
pub mod cte;
mod error;
mod light;
pub mod math;
mod path;
mod planner;
pub mod profile;
mod steering;
mod util;
mod vehicle;
