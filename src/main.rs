use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use waypoint_planner::math::Point2d;
use waypoint_planner::{
    ConfigError, InputBuffer, LightColor, LightStateFilter, PlannerConfig, SteeringParams,
    StopLineLocator, VehicleState, Waypoint, WaypointUpdater, YawController,
};

/// Drives a simulated vehicle around a circular route with one traffic light,
/// which is red for the first part of the run.
fn main() -> Result<(), ConfigError> {
    const RADIUS: f64 = 50.0;
    const NUM_WPS: usize = 300;
    const DT: f64 = 0.1;
    const RED_UNTIL: f64 = 40.0;
    const MAX_ACC: f64 = 3.0;

    let config = PlannerConfig::default();
    let steering = YawController::new(SteeringParams {
        wheel_base: 2.8,
        steer_ratio: 14.8,
        min_speed: 0.1,
        max_lat_accel: 3.0,
        max_steer_angle: 8.0,
    });

    let route: Vec<_> = (0..NUM_WPS)
        .map(|i| {
            let angle = TAU * i as f64 / NUM_WPS as f64;
            Waypoint::new(Point2d::new(RADIUS * angle.cos(), RADIUS * angle.sin()), 0.0)
        })
        .collect();
    let light_pos = route[NUM_WPS / 2].position;
    let locator = StopLineLocator::new(vec![light_pos], &config.light);
    let mut light_filter = LightStateFilter::new(&config.light);

    let inputs = InputBuffer::new();
    inputs.on_route_update(route);
    let mut updater = WaypointUpdater::new(config, inputs.clone())?;

    let mut vehicle = VehicleState::new(Point2d::new(RADIUS, 0.0), TAU / 4.0, 0.0);
    let mut busy = Duration::ZERO;
    let num_ticks: u32 = 600;

    println!("Simulating...");
    for tick in 0..num_ticks {
        let time = tick as f64 * DT;
        inputs.on_pose_update(vehicle.position, vehicle.yaw);
        inputs.on_velocity_update(vehicle.speed);

        let color = if time < RED_UNTIL {
            LightColor::Red
        } else {
            LightColor::Green
        };
        if let Some(snapshot) = inputs.snapshot().path {
            let stop_idx = locator.stop_index(&snapshot, &vehicle);
            inputs.on_stop_request(light_filter.observe(color, stop_idx));
        }

        let start = Instant::now();
        let output = match updater.tick() {
            Some(output) => output,
            None => continue,
        };
        busy += start.elapsed();

        // Pure pursuit towards a waypoint a few metres ahead
        let (desired_vel, target) = match (output.lookahead.get(1), output.lookahead.get(5)) {
            (Some(next), Some(target)) => (next.speed, target.position),
            _ => continue,
        };
        let local = vehicle.to_local(target);
        let curvature = 2.0 * local.y / (local.x.powi(2) + local.y.powi(2));
        let angle = steering.steering(desired_vel, desired_vel * curvature, vehicle.speed);

        // Integrate a kinematic bicycle
        let params = steering.params();
        let yaw_rate = vehicle.speed * (angle / params.steer_ratio).tan() / params.wheel_base;
        let acc = ((desired_vel - vehicle.speed) / DT).clamp(-MAX_ACC, MAX_ACC);
        vehicle.speed = f64::max(vehicle.speed + acc * DT, 0.0);
        vehicle.yaw += yaw_rate * DT;
        vehicle.position += vehicle.direction() * vehicle.speed * DT;

        if tick % 20 == 0 {
            println!(
                "t = {:5.1} s  {:?}  wp {:3}  speed {:5.2} m/s  cte {:>6}  steer {:+.3}",
                time,
                output.state,
                output.closest_idx,
                vehicle.speed,
                output
                    .cross_track_error
                    .map_or("n/a".to_string(), |cte| format!("{cte:+.3}")),
                angle,
            );
        }
    }

    println!("Avg. tick: {:?}", busy / num_ticks);
    Ok(())
}
