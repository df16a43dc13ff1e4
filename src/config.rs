//! Tunable parameters of the planner.

use serde::Deserialize;
use thiserror::Error;

/// An error that occurs while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot parse the configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Parameters of the waypoint planner.
///
/// The stop thresholds are tuned values rather than derived ones and
/// should be validated against the dynamics of the real vehicle.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    /// The number of waypoints in the published lookahead path.
    pub lookahead_wps: usize,
    /// The cruise speed in m/s, unless overridden at runtime.
    pub target_velocity: f64,
    /// The length of the transition of each cruise profile.
    pub cruise_duration: f64,
    /// A stop is considered imminent when it can be reached in less than this many seconds.
    pub braking_duration: f64,
    /// How much harder than strictly necessary to brake for a stop line.
    pub overshoot_margin: f64,
    /// Once past the stop line, keep stopping only while within this many metres of it.
    pub passed_stop_distance: f64,
    /// A slow vehicle within this many metres of the stop line keeps stopping.
    pub near_stop_distance: f64,
    /// Speeds below this, in m/s, count as slow for `near_stop_distance`.
    pub standstill_speed: f64,
    /// Floor on the speed used to estimate the time to reach the stop line, in m/s.
    pub min_speed: f64,
    /// The number of waypoints used to estimate the cross track error.
    pub cte_lookahead: usize,
    /// The rate of the control loop in Hz.
    pub tick_rate: f64,
    /// Parameters of the traffic light pipeline.
    pub light: LightConfig,
}

/// Parameters of the traffic light pipeline.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    /// The number of consecutive identical observations before a light colour is trusted.
    pub state_count_threshold: usize,
    /// Lights up to this many metres behind the vehicle are still considered.
    pub visibility_margin: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lookahead_wps: 200,
            target_velocity: 10.0,
            cruise_duration: 4.0,
            braking_duration: 4.0,
            overshoot_margin: 1.25,
            passed_stop_distance: 2.0,
            near_stop_distance: 2.0,
            standstill_speed: 1.0,
            min_speed: 0.1,
            cte_lookahead: 10,
            tick_rate: 10.0,
            light: LightConfig::default(),
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            state_count_threshold: 3,
            visibility_margin: 15.0,
        }
    }
}

impl PlannerConfig {
    /// Parses and validates a configuration from JSON.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the parameters are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookahead_wps == 0 {
            return Err(ConfigError::Invalid("lookahead_wps must be positive"));
        }
        if self.cte_lookahead < 4 {
            return Err(ConfigError::Invalid("cte_lookahead must be at least 4"));
        }
        if self.overshoot_margin < 1.0 {
            return Err(ConfigError::Invalid("overshoot_margin must be at least 1"));
        }
        if self.min_speed <= 0.0 || self.tick_rate <= 0.0 {
            return Err(ConfigError::Invalid("min_speed and tick_rate must be positive"));
        }
        if self.cruise_duration <= 0.0 || self.braking_duration <= 0.0 {
            return Err(ConfigError::Invalid("profile durations must be positive"));
        }
        Ok(())
    }
}
