//! Configuration loading for Lakshya.
//!
//! The hosting process owns its own configuration format; this module is
//! the TOML shape it uses to seed a checker's initial parameter values
//! before `initialize` runs.

use crate::error::Result;
use crate::params::{
    ParamValue, ParameterStore, DEFAULT_ROT_STOPPED_VELOCITY, DEFAULT_STATEFUL,
    DEFAULT_TRANS_STOPPED_VELOCITY, DEFAULT_XY_GOAL_TOLERANCE, DEFAULT_YAW_GOAL_TOLERANCE,
};
use serde::Deserialize;
use std::path::Path;

/// Goal checker startup configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct CheckerConfig {
    /// Goal checker plugin to instantiate (default: "simple_goal_checker")
    #[serde(default = "default_plugin")]
    pub plugin: String,

    /// XY goal tolerance in meters (default: 0.25)
    #[serde(default = "default_xy_goal_tolerance")]
    pub xy_goal_tolerance: f32,

    /// Yaw goal tolerance in radians (default: 0.25)
    #[serde(default = "default_yaw_goal_tolerance")]
    pub yaw_goal_tolerance: f32,

    /// Whether the reached latch is sticky until reset (default: true)
    #[serde(default = "default_stateful")]
    pub stateful: bool,

    /// Translational stopped-velocity threshold in m/s (default: 0.25)
    #[serde(default = "default_trans_stopped_velocity")]
    pub trans_stopped_velocity: f32,

    /// Rotational stopped-velocity threshold in rad/s (default: 0.25)
    #[serde(default = "default_rot_stopped_velocity")]
    pub rot_stopped_velocity: f32,
}

// Default value functions
fn default_plugin() -> String {
    "simple_goal_checker".to_string()
}
fn default_xy_goal_tolerance() -> f32 {
    DEFAULT_XY_GOAL_TOLERANCE
}
fn default_yaw_goal_tolerance() -> f32 {
    DEFAULT_YAW_GOAL_TOLERANCE
}
fn default_stateful() -> bool {
    DEFAULT_STATEFUL
}
fn default_trans_stopped_velocity() -> f32 {
    DEFAULT_TRANS_STOPPED_VELOCITY
}
fn default_rot_stopped_velocity() -> f32 {
    DEFAULT_ROT_STOPPED_VELOCITY
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            plugin: default_plugin(),
            xy_goal_tolerance: default_xy_goal_tolerance(),
            yaw_goal_tolerance: default_yaw_goal_tolerance(),
            stateful: default_stateful(),
            trans_stopped_velocity: default_trans_stopped_velocity(),
            rot_stopped_velocity: default_rot_stopped_velocity(),
        }
    }
}

impl CheckerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::LakshyaError::Config(format!("Failed to read config file: {}", e))
        })?;
        let config: CheckerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Seed a parameter store with these values under `plugin_name`.
    ///
    /// Out-of-range values are caught later by the checker's `initialize`,
    /// which is the single place range validation lives.
    pub fn seed_params(&self, params: &ParameterStore, plugin_name: &str) {
        params.seed(
            format!("{}.xy_goal_tolerance", plugin_name),
            ParamValue::Float(self.xy_goal_tolerance),
        );
        params.seed(
            format!("{}.yaw_goal_tolerance", plugin_name),
            ParamValue::Float(self.yaw_goal_tolerance),
        );
        params.seed(
            format!("{}.stateful", plugin_name),
            ParamValue::Bool(self.stateful),
        );
        params.seed(
            format!("{}.trans_stopped_velocity", plugin_name),
            ParamValue::Float(self.trans_stopped_velocity),
        );
        params.seed(
            format!("{}.rot_stopped_velocity", plugin_name),
            ParamValue::Float(self.rot_stopped_velocity),
        );
    }
}
