//! The boundary between the asynchronous input feeds and the periodic control loop.
//!
//! Feeds write the latest pose, speed, route and stop request into an
//! [InputBuffer] whenever they arrive. At the start of each tick the
//! [WaypointUpdater] takes an owned snapshot of the buffer and plans from that
//! snapshot alone, so nothing it reads can change while the tick is running.

use crate::config::{ConfigError, PlannerConfig};
use crate::cte;
use crate::math::Point2d;
use crate::path::{Path, Waypoint};
use crate::planner::{Planner, PlannerStateKind, StopRequest};
use crate::vehicle::{yaw_from_quaternion, VehicleState};
use cgmath::Quaternion;
use log::{debug, trace, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// The latest value received from each input feed.
#[derive(Clone, Debug, Default)]
pub struct Inputs {
    /// The vehicle's position and yaw.
    pub pose: Option<(Point2d, f64)>,
    /// The vehicle's speed in m/s.
    pub speed: Option<f64>,
    /// The route to follow.
    pub path: Option<Arc<Path>>,
    /// The stop line to stop at, if any.
    pub stop: StopRequest,
    /// A runtime override of the cruise speed in m/s.
    pub target_speed: Option<f64>,
}

/// A handle through which input feeds deliver their values.
///
/// Cloning the handle shares the underlying buffer.
#[derive(Clone, Debug, Default)]
pub struct InputBuffer {
    inputs: Arc<Mutex<Inputs>>,
}

impl InputBuffer {
    /// Creates an empty input buffer.
    pub fn new() -> Self {
        Default::default()
    }

    /// Records the vehicle's position and heading.
    pub fn on_pose_update(&self, position: Point2d, yaw: f64) {
        self.inputs.lock().pose = Some((position, yaw));
    }

    /// Records the vehicle's position and an orientation quaternion.
    pub fn on_pose_quaternion(&self, position: Point2d, orientation: Quaternion<f64>) {
        self.on_pose_update(position, yaw_from_quaternion(orientation));
    }

    /// Records the vehicle's speed.
    pub fn on_velocity_update(&self, speed: f64) {
        self.inputs.lock().speed = Some(speed);
    }

    /// Replaces the route. Routes with fewer than two waypoints are ignored.
    pub fn on_route_update(&self, waypoints: Vec<Waypoint>) {
        match Path::new(waypoints) {
            Ok(path) => self.inputs.lock().path = Some(Arc::new(path)),
            Err(err) => warn!("ignoring route: {err}"),
        }
    }

    /// Records the latest stop request.
    pub fn on_stop_request(&self, stop: StopRequest) {
        self.inputs.lock().stop = stop;
    }

    /// Overrides the cruise speed.
    pub fn on_target_speed_update(&self, speed: f64) {
        self.inputs.lock().target_speed = Some(speed);
    }

    /// Takes a copy of the latest inputs.
    pub fn snapshot(&self) -> Inputs {
        self.inputs.lock().clone()
    }
}

/// The outputs of a single tick of the control loop.
#[derive(Clone, Debug)]
pub struct TickOutput {
    /// The index of the nearest waypoint ahead of the vehicle.
    pub closest_idx: usize,
    /// The planner's state after the tick.
    pub state: PlannerStateKind,
    /// The vehicle state the tick planned from.
    pub vehicle: VehicleState,
    /// The waypoints ahead of the vehicle, with their target speeds.
    pub lookahead: Vec<Waypoint>,
    /// The lateral offset of the path from the vehicle, if it could be estimated.
    pub cross_track_error: Option<f64>,
}

/// The periodic control loop which plans the path ahead of the vehicle.
#[derive(Debug)]
pub struct WaypointUpdater {
    config: PlannerConfig,
    inputs: InputBuffer,
    planner: Planner,
    /// The path planned on during the last tick.
    path: Option<Arc<Path>>,
    /// The speed during the last tick.
    last_speed: Option<f64>,
    /// Whether the last tick was skipped for lack of inputs.
    waiting: bool,
}

impl WaypointUpdater {
    /// Creates a new control loop reading from the given input buffer.
    ///
    /// Fails if the configuration does not pass [PlannerConfig::validate].
    pub fn new(config: PlannerConfig, inputs: InputBuffer) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            planner: Planner::new(config.clone()),
            config,
            inputs,
            path: None,
            last_speed: None,
            waiting: false,
        })
    }

    /// The handle used to feed inputs to this loop.
    pub fn inputs(&self) -> &InputBuffer {
        &self.inputs
    }

    /// The planner owned by this loop.
    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Runs one tick of the control loop.
    ///
    /// Returns `None` without doing anything if the pose, speed or route have not arrived yet.
    pub fn tick(&mut self) -> Option<TickOutput> {
        let inputs = self.inputs.snapshot();
        let (path, (position, yaw), speed) = match (inputs.path, inputs.pose, inputs.speed) {
            (Some(path), Some(pose), Some(speed)) => (path, pose, speed),
            _ => {
                if !self.waiting {
                    warn!("waiting for pose, speed and route before planning");
                    self.waiting = true;
                }
                return None;
            }
        };
        self.waiting = false;

        if !self.path.as_ref().map_or(false, |old| Arc::ptr_eq(old, &path)) {
            debug!("new route with {} waypoints", path.len());
            self.planner.reset();
            self.path = Some(path.clone());
        }

        let acceleration = self
            .last_speed
            .map_or(0.0, |last| (speed - last) * self.config.tick_rate);
        self.last_speed = Some(speed);
        let vehicle = VehicleState {
            position,
            yaw,
            speed,
            acceleration,
        };

        let target = inputs.target_speed.unwrap_or(self.config.target_velocity);
        let closest_idx = path.closest_ahead(&vehicle);
        trace!("closest waypoint ahead is {closest_idx}");
        let state = self
            .planner
            .update(&path, closest_idx, inputs.stop, speed, target);
        let lookahead = self
            .planner
            .lookahead(&path, closest_idx, self.config.lookahead_wps);

        let cross_track_error =
            match cte::estimate_from(&path, &vehicle, closest_idx, self.config.cte_lookahead) {
                Ok(cte) => Some(cte),
                Err(err) => {
                    warn!("cross track error unavailable: {err}");
                    None
                }
            };

        Some(TickOutput {
            closest_idx,
            state,
            vehicle,
            lookahead,
            cross_track_error,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn straight(len: usize) -> Vec<Waypoint> {
        (0..len)
            .map(|i| Waypoint::new(Point2d::new(i as f64, 0.0), 0.0))
            .collect()
    }

    #[test]
    fn waits_for_inputs() {
        let mut updater =
            WaypointUpdater::new(PlannerConfig::default(), InputBuffer::new()).unwrap();
        assert!(updater.tick().is_none());

        updater.inputs().on_pose_update(Point2d::new(0.5, 0.0), 0.0);
        updater.inputs().on_velocity_update(5.0);
        assert!(updater.tick().is_none());

        updater.inputs().on_route_update(straight(1));
        assert!(updater.tick().is_none());

        updater.inputs().on_route_update(straight(300));
        let output = updater.tick().unwrap();
        assert_eq!(output.closest_idx, 1);
        assert_eq!(output.lookahead.len(), 200);
        assert_approx_eq!(output.cross_track_error.unwrap(), 0.0, 1e-6);
    }

    #[test]
    fn estimates_acceleration() {
        let inputs = InputBuffer::new();
        let mut updater =
            WaypointUpdater::new(PlannerConfig::default(), inputs.clone()).unwrap();
        inputs.on_route_update(straight(300));
        inputs.on_pose_update(Point2d::new(0.5, 0.0), 0.0);
        inputs.on_velocity_update(5.0);
        assert_eq!(updater.tick().unwrap().vehicle.acceleration, 0.0);

        inputs.on_velocity_update(5.5);
        assert_approx_eq!(updater.tick().unwrap().vehicle.acceleration, 5.0);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = PlannerConfig {
            tick_rate: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            WaypointUpdater::new(config, InputBuffer::new()),
            Err(ConfigError::Invalid(_))
        ));

        let config = PlannerConfig {
            min_speed: -1.0,
            ..Default::default()
        };
        assert!(WaypointUpdater::new(config, InputBuffer::new()).is_err());
    }

    #[test]
    fn snapshot_is_detached() {
        let inputs = InputBuffer::new();
        inputs.on_velocity_update(5.0);
        let snapshot = inputs.snapshot();
        inputs.on_velocity_update(7.0);
        assert_eq!(snapshot.speed, Some(5.0));
        assert_eq!(inputs.snapshot().speed, Some(7.0));
    }

    #[test]
    fn new_route_resets_planner() {
        let inputs = InputBuffer::new();
        let mut updater =
            WaypointUpdater::new(PlannerConfig::default(), inputs.clone()).unwrap();
        inputs.on_route_update(straight(300));
        inputs.on_pose_update(Point2d::new(10.5, 0.0), 0.0);
        inputs.on_velocity_update(10.0);
        inputs.on_stop_request(Some(30));
        assert_eq!(updater.tick().unwrap().state, PlannerStateKind::StopAtTl);

        // The stop line index means nothing on the new route
        inputs.on_route_update(straight(300));
        inputs.on_stop_request(None);
        let output = updater.tick().unwrap();
        assert_eq!(output.state, PlannerStateKind::KeepVelocity);
        assert_eq!(updater.planner().state().unwrap().origin(), 11);
    }

    #[test]
    fn target_speed_override() {
        let inputs = InputBuffer::new();
        let mut updater =
            WaypointUpdater::new(PlannerConfig::default(), inputs.clone()).unwrap();
        inputs.on_route_update(straight(300));
        inputs.on_pose_update(Point2d::new(0.5, 0.0), 0.0);
        inputs.on_velocity_update(5.0);
        inputs.on_target_speed_update(20.0);
        let output = updater.tick().unwrap();
        assert_eq!(output.lookahead.last().unwrap().speed, 20.0);
    }
}
