//! Turns traffic light observations into stop requests.
//!
//! The colour of the light ahead comes from an external classifier. This module
//! works out which stop line that colour applies to and debounces the colour
//! before asking the planner to stop.

use crate::config::LightConfig;
use crate::math::Point2d;
use crate::path::Path;
use crate::planner::StopRequest;
use crate::vehicle::VehicleState;
use log::debug;

/// The colour of a traffic light, as reported by the classifier.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LightColor {
    Red,
    Yellow,
    Green,
    Unknown,
}

/// Finds the traffic light, and its stop line, that applies to the vehicle.
#[derive(Clone, Debug)]
pub struct StopLineLocator {
    /// The world space coordinates of each traffic light's stop line.
    lights: Vec<Point2d>,
    /// Lights up to this many metres behind the vehicle are still considered.
    visibility_margin: f64,
}

impl StopLineLocator {
    /// Creates a new locator for the given stop line positions.
    pub fn new(lights: Vec<Point2d>, config: &LightConfig) -> Self {
        Self {
            lights,
            visibility_margin: config.visibility_margin,
        }
    }

    /// Gets the index of the nearest light which is not far behind the vehicle.
    ///
    /// A light remains relevant for a short distance after it is passed, because
    /// the vehicle may still be rolling up to or over its stop line.
    pub fn nearest_visible(&self, vehicle: &VehicleState) -> Option<usize> {
        self.lights
            .iter()
            .map(|light| vehicle.to_local(*light))
            .enumerate()
            .filter(|(_, local)| local.x > -self.visibility_margin)
            .map(|(idx, local)| (idx, local.x.powi(2) + local.y.powi(2)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, _)| idx)
    }

    /// Gets the index of the waypoint nearest to the stop line of the light ahead, if there is one.
    pub fn stop_index(&self, path: &Path, vehicle: &VehicleState) -> Option<usize> {
        self.nearest_visible(vehicle)
            .map(|idx| path.closest_to(self.lights[idx]))
    }
}

/// Debounces classifier output, so a single misclassified frame does not
/// cause the vehicle to brake or to run a light.
#[derive(Clone, Debug)]
pub struct LightStateFilter {
    /// The most recently observed colour.
    state: LightColor,
    /// The number of consecutive observations of `state`, excluding the latest.
    since: usize,
    /// The number of observations needed before a new colour is trusted.
    threshold: usize,
    /// The stop request derived from the last trusted colour.
    stable: StopRequest,
}

impl LightStateFilter {
    /// Creates a new filter, which starts out not requesting a stop.
    pub fn new(config: &LightConfig) -> Self {
        Self {
            state: LightColor::Unknown,
            since: 0,
            threshold: config.state_count_threshold,
            stable: None,
        }
    }

    /// The stop request derived from the last trusted colour.
    pub fn current(&self) -> StopRequest {
        self.stable
    }

    /// Records an observation of the light ahead and returns the resulting stop request.
    ///
    /// # Parameters
    /// * `color` - The classified colour of the light
    /// * `stop_idx` - The waypoint index of the light's stop line, if a light is in view
    pub fn observe(&mut self, color: LightColor, stop_idx: Option<usize>) -> StopRequest {
        if color != self.state {
            self.state = color;
            self.since = 0;
        } else if self.since >= self.threshold {
            let stable = match color {
                LightColor::Red => stop_idx,
                _ => None,
            };
            if stable != self.stable {
                debug!("light {color:?} trusted, stop request {stable:?}");
            }
            self.stable = stable;
        }
        self.since += 1;
        self.stable
    }
}
