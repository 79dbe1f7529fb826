//! Goal checking: decides whether the robot has arrived at its goal.
//!
//! The local controller calls [`GoalChecker::is_goal_reached`] once per
//! control cycle with the current pose, the goal pose, and the current
//! velocity. Checkers are interchangeable plugins behind the
//! [`GoalChecker`] trait, selected by name at startup through
//! [`create_goal_checker`].
//!
//! # Host contract
//!
//! - `initialize` must complete before any other call; evaluation before
//!   that returns [`LakshyaError::Uninitialized`].
//! - `reset` must be called whenever a new goal is issued, otherwise a
//!   stale reached latch from the previous goal short-circuits the new one.
//!
//! # Variants
//!
//! - [`SimpleGoalChecker`]: planar distance plus yaw tolerance.
//! - [`StoppedGoalChecker`]: additionally requires the robot to have
//!   (nearly) stopped moving.

mod simple;
mod stopped;

pub use simple::SimpleGoalChecker;
pub use stopped::StoppedGoalChecker;

use crate::core::math::angle_diff;
use crate::core::types::{Pose2D, Twist2D};
use crate::error::{LakshyaError, Result};
use crate::params::{ParameterStore, ToleranceConfig};

/// Current tolerances of a goal checker, for diagnostics and visualization.
///
/// `pose.x` and `pose.y` carry the xy tolerance, `pose.theta` the yaw
/// tolerance. `velocity` is zero for checkers that do not gate on velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalTolerances {
    /// Pose tolerance (xy in x/y, yaw in theta).
    pub pose: Pose2D,
    /// Velocity tolerance (zero when unused).
    pub velocity: Twist2D,
}

/// A goal-arrival checking strategy.
///
/// Every call is a bounded synchronous computation: no I/O, no waiting,
/// O(1) work per evaluation.
pub trait GoalChecker: Send {
    /// Declare and load this checker's parameters under `plugin_name`,
    /// publish the initial tolerance snapshot, and register for future
    /// parameter changes.
    ///
    /// Fails with [`LakshyaError::Config`] if an initial value is out of
    /// range; nothing is published in that case.
    ///
    /// Calling `initialize` again on the same store replaces this checker's
    /// earlier parameter registrations rather than adding to them.
    fn initialize(&mut self, params: &ParameterStore, plugin_name: &str) -> Result<()>;

    /// Clear the reached latch. Call whenever a new goal is issued.
    fn reset(&mut self);

    /// Whether the robot has arrived at `goal`.
    ///
    /// `velocity` is part of the interface for every checker; variants
    /// that do not gate on it ignore it.
    fn is_goal_reached(
        &mut self,
        current: &Pose2D,
        goal: &Pose2D,
        velocity: &Twist2D,
    ) -> Result<bool>;

    /// Current tolerance values.
    fn get_tolerances(&self) -> Result<GoalTolerances>;
}

/// Create a goal checker by plugin kind.
///
/// Recognized kinds: `simple_goal_checker`, `stopped_goal_checker`.
pub fn create_goal_checker(kind: &str) -> Result<Box<dyn GoalChecker>> {
    match kind {
        "simple_goal_checker" => Ok(Box::new(SimpleGoalChecker::new())),
        "stopped_goal_checker" => Ok(Box::new(StoppedGoalChecker::new())),
        other => Err(LakshyaError::Config(format!(
            "Unknown goal checker plugin: {}",
            other
        ))),
    }
}

/// Instantaneous pose check against a tolerance snapshot.
///
/// Squared planar distance first (cheapest), then yaw via shortest-path
/// angular difference unless the snapshot is xy-only.
pub(crate) fn pose_within_tolerance(
    cfg: &ToleranceConfig,
    current: &Pose2D,
    goal: &Pose2D,
) -> bool {
    if current.planar_distance_squared(goal) > cfg.xy_goal_tolerance_sq() {
        return false;
    }
    if cfg.check_xy_only() {
        return true;
    }
    angle_diff(current.theta, goal.theta).abs() <= cfg.yaw_goal_tolerance()
}
