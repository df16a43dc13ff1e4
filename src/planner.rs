//! The stop/cruise state machine which assigns target speeds to the path ahead.

use crate::config::PlannerConfig;
use crate::math::distance;
use crate::path::{Path, Waypoint};
use crate::profile::{BrakingProfile, CruiseProfile, Profile, VelocityProfile};
use log::{debug, trace, warn};

/// The waypoint index of a stop line the vehicle must stop at, if there is one.
///
/// This is a level signal: the most recent value is the one that applies.
pub type StopRequest = Option<usize>;

/// What the planner is currently trying to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlannerStateKind {
    /// Drive at the target speed.
    KeepVelocity,
    /// Stop at a traffic light's stop line.
    StopAtTl,
}

/// The state of the planner, including the profile it is executing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlannerState {
    KeepVelocity {
        /// The profile being followed.
        profile: CruiseProfile,
        /// The waypoint index at which the profile began.
        origin: usize,
    },
    StopAtTl {
        /// The profile being followed.
        profile: BrakingProfile,
        /// The waypoint index at which the profile began.
        origin: usize,
        /// The waypoint index of the stop line.
        stop_idx: usize,
    },
}

impl PlannerState {
    /// The kind of state, without its profile.
    pub fn kind(&self) -> PlannerStateKind {
        match self {
            PlannerState::KeepVelocity { .. } => PlannerStateKind::KeepVelocity,
            PlannerState::StopAtTl { .. } => PlannerStateKind::StopAtTl,
        }
    }

    /// The active profile.
    pub fn profile(&self) -> Profile {
        match self {
            PlannerState::KeepVelocity { profile, .. } => Profile::Cruise(*profile),
            PlannerState::StopAtTl { profile, .. } => Profile::Braking(*profile),
        }
    }

    /// The waypoint index at which the active profile began.
    pub fn origin(&self) -> usize {
        match self {
            PlannerState::KeepVelocity { origin, .. } => *origin,
            PlannerState::StopAtTl { origin, .. } => *origin,
        }
    }
}

/// Decides whether to cruise or stop, and generates the target speeds along the path.
#[derive(Clone, Debug)]
pub struct Planner {
    config: PlannerConfig,
    /// `None` until the first update, which behaves as keeping velocity.
    state: Option<PlannerState>,
    /// The waypoint index passed to the last update.
    last_idx: usize,
    /// The distance along the path from the profile's origin to `last_idx`, in m.
    progress: f64,
}

impl Planner {
    /// Creates a new planner.
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            state: None,
            last_idx: 0,
            progress: 0.0,
        }
    }

    /// The current state, or `None` if the planner has not been updated yet.
    pub fn state(&self) -> Option<&PlannerState> {
        self.state.as_ref()
    }

    /// The kind of the current state.
    pub fn kind(&self) -> PlannerStateKind {
        self.state
            .map(|state| state.kind())
            .unwrap_or(PlannerStateKind::KeepVelocity)
    }

    /// The distance travelled along the path since the active profile began, in m.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Forgets the active profile, e.g. because the path it refers to has been replaced.
    pub fn reset(&mut self) {
        self.state = None;
        self.last_idx = 0;
        self.progress = 0.0;
    }

    /// Re-evaluates whether to stop, switching profile if the decision changed.
    ///
    /// # Parameters
    /// * `path` - The route being followed
    /// * `current_idx` - The index of the nearest waypoint ahead of the vehicle
    /// * `stop` - The latest stop request
    /// * `speed` - The vehicle's speed in m/s
    /// * `target_vel` - The cruise speed in m/s
    pub fn update(
        &mut self,
        path: &Path,
        current_idx: usize,
        stop: StopRequest,
        speed: f64,
        target_vel: f64,
    ) -> PlannerStateKind {
        let current_idx = path.wrap(current_idx);
        self.progress += signed_arc_length(path, self.last_idx, current_idx);
        self.last_idx = current_idx;

        let stop = stop.filter(|idx| {
            let valid = *idx < path.len();
            if !valid {
                warn!("ignoring stop request at waypoint {idx}, path has {} waypoints", path.len());
            }
            valid
        });
        // Once braking for a line, keep braking for it until it is passed or the request changes
        let holding = matches!(
            self.state,
            Some(PlannerState::StopAtTl { stop_idx, .. })
                if stop == Some(stop_idx) && !has_passed(path, current_idx, stop_idx)
        );
        let stop_near = holding || self.stop_near(path, current_idx, stop, speed);

        let next = match (self.state, stop.filter(|_| stop_near)) {
            (Some(PlannerState::StopAtTl { stop_idx, .. }), Some(idx)) if stop_idx == idx => None,
            (_, Some(stop_idx)) => {
                let dist = self.distance_to_stop(path, current_idx, stop_idx);
                Some(PlannerState::StopAtTl {
                    profile: BrakingProfile::new(speed, dist, self.config.overshoot_margin),
                    origin: current_idx,
                    stop_idx,
                })
            }
            (Some(PlannerState::KeepVelocity { profile, .. }), None)
                if profile.target() == target_vel =>
            {
                None
            }
            (_, None) => Some(PlannerState::KeepVelocity {
                profile: CruiseProfile::new(speed, target_vel, self.config.cruise_duration),
                origin: current_idx,
            }),
        };

        if let Some(next) = next {
            debug!(
                "planner {:?} -> {:?} at waypoint {current_idx}, speed {speed:.2}",
                self.state.map(|state| state.kind()),
                next.kind(),
            );
            self.state = Some(next);
            self.progress = 0.0;
        }
        self.kind()
    }

    /// Determines whether the vehicle should be stopping for the requested stop line.
    pub fn stop_near(&self, path: &Path, current_idx: usize, stop: StopRequest, speed: f64) -> bool {
        let stop_idx = match stop {
            Some(idx) => idx,
            None => return false,
        };

        if has_passed(path, current_idx, stop_idx) {
            return path.arc_length(stop_idx, current_idx) < self.config.passed_stop_distance;
        }

        let dist = path.arc_length(current_idx, stop_idx);
        let time_to_stop = dist / f64::max(speed, self.config.min_speed);
        time_to_stop < self.config.braking_duration
            || (speed < self.config.standstill_speed && dist < self.config.near_stop_distance)
    }

    /// The distance from the current waypoint to the stop line, or zero if it has been passed.
    pub fn distance_to_stop(&self, path: &Path, current_idx: usize, stop_idx: usize) -> f64 {
        if has_passed(path, current_idx, stop_idx) {
            0.0
        } else {
            path.arc_length(current_idx, stop_idx)
        }
    }

    /// Produces the `count` waypoints starting at `current_idx`, annotated with target speeds.
    ///
    /// `current_idx` should be at or near the index given to the last update.
    /// Returns an empty path if the planner has not been updated yet.
    pub fn lookahead(&self, path: &Path, current_idx: usize, count: usize) -> Vec<Waypoint> {
        let state = match self.state {
            Some(state) => state,
            None => return vec![],
        };
        let current_idx = path.wrap(current_idx);
        let profile = state.profile();
        let stop_offset = match state {
            PlannerState::StopAtTl { stop_idx, .. } if !has_passed(path, current_idx, stop_idx) => {
                Some(path.forward_offset(current_idx, stop_idx))
            }
            _ => None,
        };

        let mut dist = self.progress + signed_arc_length(path, self.last_idx, current_idx);
        trace!("lookahead from waypoint {current_idx}, {dist:.2} m into profile");

        let mut prev = path.get(current_idx).position;
        path.indices_from(current_idx, count)
            .enumerate()
            .map(|(offset, idx)| {
                let position = path.get(idx).position;
                dist += distance(prev, position);
                prev = position;
                let speed = match stop_offset {
                    Some(stop_offset) if offset >= stop_offset => 0.0,
                    _ => profile.velocity_at(dist),
                };
                Waypoint::new(position, speed)
            })
            .collect()
    }
}

/// Whether the vehicle has gone past the stop line, i.e. it is nearer behind than ahead.
fn has_passed(path: &Path, current_idx: usize, stop_idx: usize) -> bool {
    path.forward_offset(stop_idx, current_idx) < path.forward_offset(current_idx, stop_idx)
}

/// The arc length from `from` to `to`, negative if `to` is nearer behind `from` than ahead of it.
fn signed_arc_length(path: &Path, from: usize, to: usize) -> f64 {
    if has_passed(path, from, to) {
        -path.arc_length(to, from)
    } else {
        path.arc_length(from, to)
    }
}
