//! Stopped goal checker: pose tolerance plus a velocity-zero gate.

use crate::checker::simple::{declare_and_load_pose_tolerances, register_pose_callbacks};
use crate::checker::{pose_within_tolerance, GoalChecker, GoalTolerances, SimpleGoalChecker};
use crate::core::types::{Pose2D, Twist2D};
use crate::error::{LakshyaError, Result};
use crate::params::{
    ParamValue, ParameterStore, SharedTolerances, SharedVelocityTolerances, VelocityTolerances,
    DEFAULT_ROT_STOPPED_VELOCITY, DEFAULT_TRANS_STOPPED_VELOCITY,
};

/// Goal checker that also requires the robot to have stopped.
///
/// The pose check is identical to [`SimpleGoalChecker`]; on top of it the
/// current twist must satisfy `|angular| <= rot_stopped_velocity` and
/// `hypot(linear_x, linear_y) <= trans_stopped_velocity`. In stateful mode
/// the latch is only set once the velocity gate passes too, so a robot
/// coasting through the goal region does not latch arrival.
///
/// Additional recognized parameters: `trans_stopped_velocity`
/// (default 0.25 m/s), `rot_stopped_velocity` (default 0.25 rad/s).
pub struct StoppedGoalChecker {
    pose: SimpleGoalChecker,
    velocity: Option<SharedVelocityTolerances>,
}

impl StoppedGoalChecker {
    /// Create an uninitialized stopped goal checker.
    pub fn new() -> Self {
        Self {
            pose: SimpleGoalChecker::new(),
            velocity: None,
        }
    }

    fn shared(&self) -> Result<(&SharedTolerances, &SharedVelocityTolerances)> {
        match (self.pose.tolerances.as_ref(), self.velocity.as_ref()) {
            (Some(pose), Some(vel)) => Ok((pose, vel)),
            _ => Err(LakshyaError::Uninitialized("stopped_goal_checker")),
        }
    }
}

impl Default for StoppedGoalChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl GoalChecker for StoppedGoalChecker {
    fn initialize(&mut self, params: &ParameterStore, plugin_name: &str) -> Result<()> {
        // Velocity thresholds first: if they are out of range, fail before
        // the pose side publishes anything.
        let vel_cfg = declare_and_load_velocity_tolerances(params, plugin_name)?;

        let pose_cfg = declare_and_load_pose_tolerances(params, plugin_name, false)?;
        let pose_shared = SharedTolerances::new(pose_cfg);
        register_pose_callbacks(params, plugin_name, &pose_shared);

        let vel_shared = SharedVelocityTolerances::new(vel_cfg);
        register_velocity_callbacks(params, plugin_name, &vel_shared);

        log::info!(
            "{}: initialized (trans_stopped_velocity={}, rot_stopped_velocity={})",
            plugin_name,
            vel_cfg.trans_stopped_velocity(),
            vel_cfg.rot_stopped_velocity()
        );

        self.pose.plugin_name = plugin_name.to_string();
        self.pose.tolerances = Some(pose_shared);
        self.pose.reached = false;
        self.velocity = Some(vel_shared);
        Ok(())
    }

    fn reset(&mut self) {
        self.pose.reset();
    }

    fn is_goal_reached(
        &mut self,
        current: &Pose2D,
        goal: &Pose2D,
        velocity: &Twist2D,
    ) -> Result<bool> {
        let (pose_shared, vel_shared) = self.shared()?;
        let cfg = pose_shared.snapshot();

        if cfg.stateful() && self.pose.reached {
            return Ok(true);
        }
        if !pose_within_tolerance(&cfg, current, goal) {
            return Ok(false);
        }
        if !vel_shared.snapshot().is_stopped(velocity) {
            return Ok(false);
        }
        if cfg.stateful() {
            log::debug!("{}: goal reached and stopped, latching", self.pose.plugin_name);
            self.pose.reached = true;
        }
        Ok(true)
    }

    fn get_tolerances(&self) -> Result<GoalTolerances> {
        let (_, vel_shared) = self.shared()?;
        let mut tolerances = self.pose.get_tolerances()?;
        let vel_cfg = vel_shared.snapshot();
        tolerances.velocity = Twist2D::new(
            vel_cfg.trans_stopped_velocity(),
            vel_cfg.trans_stopped_velocity(),
            vel_cfg.rot_stopped_velocity(),
        );
        Ok(tolerances)
    }
}

/// Declare the stopped-velocity parameters and build the initial thresholds.
fn declare_and_load_velocity_tolerances(
    params: &ParameterStore,
    plugin_name: &str,
) -> Result<VelocityTolerances> {
    let trans_name = format!("{}.trans_stopped_velocity", plugin_name);
    let rot_name = format!("{}.rot_stopped_velocity", plugin_name);

    params.declare(&trans_name, ParamValue::Float(DEFAULT_TRANS_STOPPED_VELOCITY));
    params.declare(&rot_name, ParamValue::Float(DEFAULT_ROT_STOPPED_VELOCITY));

    let trans = params
        .get(&trans_name)
        .and_then(|v| v.as_float())
        .ok_or_else(|| LakshyaError::Config(format!("{} must be a float", trans_name)))?;
    let rot = params
        .get(&rot_name)
        .and_then(|v| v.as_float())
        .ok_or_else(|| LakshyaError::Config(format!("{} must be a float", rot_name)))?;

    VelocityTolerances::new(trans, rot)
}

/// Keep the published velocity thresholds in sync with parameter changes.
fn register_velocity_callbacks(
    params: &ParameterStore,
    plugin_name: &str,
    shared: &SharedVelocityTolerances,
) {
    let prefix = format!("{}.", plugin_name);
    let key = format!("{}/velocity", plugin_name);

    {
        let prefix = prefix.clone();
        params.on_validate(key.clone(), move |name, value| {
            let param = match name.strip_prefix(&prefix) {
                Some(p) => p,
                None => return Ok(()),
            };
            match param {
                "trans_stopped_velocity" | "rot_stopped_velocity" => match value.as_float() {
                    Some(v) if v >= 0.0 => Ok(()),
                    Some(v) => Err(LakshyaError::Config(format!(
                        "{} must be non-negative, got {}",
                        name, v
                    ))),
                    None => Err(LakshyaError::Config(format!("{} must be a float", name))),
                },
                _ => Ok(()),
            }
        });
    }

    {
        let shared = shared.clone();
        params.on_update(key, move |name, value| {
            let param = match name.strip_prefix(&prefix) {
                Some(p) => p,
                None => return,
            };
            let prev = shared.snapshot();
            let next = match param {
                "trans_stopped_velocity" => {
                    value.as_float().map(|v| prev.with_trans_stopped_velocity(v))
                }
                "rot_stopped_velocity" => {
                    value.as_float().map(|v| prev.with_rot_stopped_velocity(v))
                }
                _ => None,
            };
            match next {
                Some(Ok(cfg)) => {
                    log::info!("Applied parameter change {} = {}", name, value);
                    shared.publish(cfg);
                }
                Some(Err(e)) => {
                    log::warn!("Ignoring parameter change {} = {}: {}", name, value, e)
                }
                None => {}
            }
        });
    }
}
