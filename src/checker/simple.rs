//! Simple pose-tolerance goal checker.

use crate::checker::{pose_within_tolerance, GoalChecker, GoalTolerances};
use crate::core::types::{Pose2D, Twist2D};
use crate::error::{LakshyaError, Result};
use crate::params::{
    ParamValue, ParameterStore, SharedTolerances, ToleranceConfig, DEFAULT_STATEFUL,
    DEFAULT_XY_GOAL_TOLERANCE, DEFAULT_YAW_GOAL_TOLERANCE,
};

/// Goal checker that compares planar distance and yaw against tolerances.
///
/// With `stateful = true` (the default) the answer latches: once the goal
/// is reached, later drift back outside tolerance does not un-reach it
/// until [`reset`] is called. With `stateful = false` every call reports
/// the instantaneous check with no memory.
///
/// Recognized parameters (namespaced under the plugin name):
/// `xy_goal_tolerance` (default 0.25 m), `yaw_goal_tolerance`
/// (default 0.25 rad), `stateful` (default true).
///
/// [`reset`]: GoalChecker::reset
pub struct SimpleGoalChecker {
    /// Published tolerance snapshot; `None` until `initialize`.
    pub(crate) tolerances: Option<SharedTolerances>,
    /// Reached latch. Written only inside `is_goal_reached`, cleared only
    /// by `reset`; single-writer on the control-loop thread.
    pub(crate) reached: bool,
    pub(crate) plugin_name: String,
    check_xy_only: bool,
}

impl SimpleGoalChecker {
    /// Create an uninitialized checker that checks both xy and yaw.
    pub fn new() -> Self {
        Self {
            tolerances: None,
            reached: false,
            plugin_name: String::new(),
            check_xy_only: false,
        }
    }

    /// Create an uninitialized checker that decides on xy alone.
    pub fn xy_only() -> Self {
        Self {
            check_xy_only: true,
            ..Self::new()
        }
    }
}

impl Default for SimpleGoalChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl GoalChecker for SimpleGoalChecker {
    fn initialize(&mut self, params: &ParameterStore, plugin_name: &str) -> Result<()> {
        let cfg = declare_and_load_pose_tolerances(params, plugin_name, self.check_xy_only)?;
        let shared = SharedTolerances::new(cfg);
        register_pose_callbacks(params, plugin_name, &shared);

        log::info!(
            "{}: initialized (xy_goal_tolerance={}, yaw_goal_tolerance={}, stateful={})",
            plugin_name,
            cfg.xy_goal_tolerance(),
            cfg.yaw_goal_tolerance(),
            cfg.stateful()
        );

        self.plugin_name = plugin_name.to_string();
        self.tolerances = Some(shared);
        self.reached = false;
        Ok(())
    }

    fn reset(&mut self) {
        self.reached = false;
    }

    /// `velocity` is accepted for interface symmetry with velocity-aware
    /// variants; this checker does not gate on it.
    fn is_goal_reached(
        &mut self,
        current: &Pose2D,
        goal: &Pose2D,
        _velocity: &Twist2D,
    ) -> Result<bool> {
        let shared = self
            .tolerances
            .as_ref()
            .ok_or(LakshyaError::Uninitialized("is_goal_reached"))?;
        let cfg = shared.snapshot();

        if cfg.stateful() && self.reached {
            return Ok(true);
        }
        if !pose_within_tolerance(&cfg, current, goal) {
            return Ok(false);
        }
        if cfg.stateful() {
            log::debug!("{}: goal reached, latching", self.plugin_name);
            self.reached = true;
        }
        Ok(true)
    }

    fn get_tolerances(&self) -> Result<GoalTolerances> {
        let shared = self
            .tolerances
            .as_ref()
            .ok_or(LakshyaError::Uninitialized("get_tolerances"))?;
        let cfg = shared.snapshot();
        Ok(GoalTolerances {
            pose: Pose2D {
                x: cfg.xy_goal_tolerance(),
                y: cfg.xy_goal_tolerance(),
                theta: cfg.yaw_goal_tolerance(),
            },
            velocity: Twist2D::zero(),
        })
    }
}

/// Declare the pose-tolerance parameters with their defaults and build the
/// initial snapshot from whatever the host seeded.
pub(crate) fn declare_and_load_pose_tolerances(
    params: &ParameterStore,
    plugin_name: &str,
    check_xy_only: bool,
) -> Result<ToleranceConfig> {
    let xy_name = format!("{}.xy_goal_tolerance", plugin_name);
    let yaw_name = format!("{}.yaw_goal_tolerance", plugin_name);
    let stateful_name = format!("{}.stateful", plugin_name);

    params.declare(&xy_name, ParamValue::Float(DEFAULT_XY_GOAL_TOLERANCE));
    params.declare(&yaw_name, ParamValue::Float(DEFAULT_YAW_GOAL_TOLERANCE));
    params.declare(&stateful_name, ParamValue::Bool(DEFAULT_STATEFUL));

    let xy = require_float(params, &xy_name)?;
    let yaw = require_float(params, &yaw_name)?;
    let stateful = require_bool(params, &stateful_name)?;

    ToleranceConfig::new(xy, yaw, stateful, check_xy_only)
}

/// Register the validation and update callbacks that keep the published
/// snapshot in sync with later parameter changes.
///
/// Unrecognized parameter names pass validation untouched and are ignored
/// by the observer. Registration is keyed per plugin, so initializing the
/// same checker again replaces its callbacks instead of stacking them.
pub(crate) fn register_pose_callbacks(
    params: &ParameterStore,
    plugin_name: &str,
    shared: &SharedTolerances,
) {
    let prefix = format!("{}.", plugin_name);
    let key = format!("{}/pose", plugin_name);

    {
        let prefix = prefix.clone();
        params.on_validate(key.clone(), move |name, value| {
            let param = match name.strip_prefix(&prefix) {
                Some(p) => p,
                None => return Ok(()),
            };
            match param {
                "xy_goal_tolerance" | "yaw_goal_tolerance" => match value.as_float() {
                    Some(v) if v >= 0.0 => Ok(()),
                    Some(v) => Err(LakshyaError::Config(format!(
                        "{} must be non-negative, got {}",
                        name, v
                    ))),
                    None => Err(LakshyaError::Config(format!("{} must be a float", name))),
                },
                "stateful" => match value.as_bool() {
                    Some(_) => Ok(()),
                    None => Err(LakshyaError::Config(format!("{} must be a bool", name))),
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
                "xy_goal_tolerance" => value.as_float().map(|v| prev.with_xy_goal_tolerance(v)),
                "yaw_goal_tolerance" => value.as_float().map(|v| prev.with_yaw_goal_tolerance(v)),
                "stateful" => value.as_bool().map(|v| prev.with_stateful(v)),
                _ => None,
            };
            match next {
                Some(Ok(cfg)) => {
                    log::info!("Applied parameter change {} = {}", name, value);
                    shared.publish(cfg);
                }
                // Validation already gated the change; a failure here means
                // the value bypassed it (e.g. seeded directly), so keep the
                // previous snapshot.
                Some(Err(e)) => {
                    log::warn!("Ignoring parameter change {} = {}: {}", name, value, e)
                }
                None => {}
            }
        });
    }
}

fn require_float(params: &ParameterStore, name: &str) -> Result<f32> {
    params
        .get(name)
        .and_then(|v| v.as_float())
        .ok_or_else(|| LakshyaError::Config(format!("{} must be a float", name)))
}

fn require_bool(params: &ParameterStore, name: &str) -> Result<bool> {
    params
        .get(name)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| LakshyaError::Config(format!("{} must be a bool", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized_checker() -> (SimpleGoalChecker, ParameterStore) {
        let params = ParameterStore::new();
        let mut checker = SimpleGoalChecker::new();
        checker.initialize(&params, "goal_checker").unwrap();
        (checker, params)
    }

    #[test]
    fn test_uninitialized_use_is_an_error() {
        let mut checker = SimpleGoalChecker::new();
        let pose = Pose2D::identity();
        let err = checker
            .is_goal_reached(&pose, &pose, &Twist2D::zero())
            .unwrap_err();
        assert!(matches!(err, LakshyaError::Uninitialized(_)));
        assert!(matches!(
            checker.get_tolerances().unwrap_err(),
            LakshyaError::Uninitialized(_)
        ));
    }

    #[test]
    fn test_initialize_declares_defaults() {
        let (checker, params) = initialized_checker();
        assert_eq!(
            params.get("goal_checker.xy_goal_tolerance"),
            Some(ParamValue::Float(DEFAULT_XY_GOAL_TOLERANCE))
        );
        assert_eq!(
            params.get("goal_checker.stateful"),
            Some(ParamValue::Bool(true))
        );

        let tol = checker.get_tolerances().unwrap();
        assert_eq!(tol.pose.x, DEFAULT_XY_GOAL_TOLERANCE);
        assert_eq!(tol.pose.theta, DEFAULT_YAW_GOAL_TOLERANCE);
        assert_eq!(tol.velocity, Twist2D::zero());
    }

    #[test]
    fn test_initialize_honors_seeded_values() {
        let params = ParameterStore::new();
        params.seed("goal_checker.xy_goal_tolerance", ParamValue::Float(0.5));
        params.seed("goal_checker.stateful", ParamValue::Bool(false));

        let mut checker = SimpleGoalChecker::new();
        checker.initialize(&params, "goal_checker").unwrap();

        let tol = checker.get_tolerances().unwrap();
        assert_eq!(tol.pose.x, 0.5);
    }

    #[test]
    fn test_initialize_rejects_negative_tolerance() {
        let params = ParameterStore::new();
        params.seed("goal_checker.xy_goal_tolerance", ParamValue::Float(-0.25));

        let mut checker = SimpleGoalChecker::new();
        let err = checker.initialize(&params, "goal_checker").unwrap_err();
        assert!(matches!(err, LakshyaError::Config(_)));
    }

    #[test]
    fn test_initialize_rejects_type_mismatch() {
        let params = ParameterStore::new();
        params.seed("goal_checker.stateful", ParamValue::Float(1.0));

        let mut checker = SimpleGoalChecker::new();
        assert!(checker.initialize(&params, "goal_checker").is_err());
    }

    #[test]
    fn test_reached_within_tolerance() {
        let (mut checker, _params) = initialized_checker();
        let goal = Pose2D::identity();
        let vel = Twist2D::zero();

        assert!(checker
            .is_goal_reached(&Pose2D::new(0.2, 0.1, 0.1), &goal, &vel)
            .unwrap());
    }

    #[test]
    fn test_not_reached_outside_tolerance() {
        let (mut checker, _params) = initialized_checker();
        let vel = Twist2D::zero();

        assert!(!checker
            .is_goal_reached(&Pose2D::new(1.0, 1.0, 0.0), &Pose2D::new(5.0, 5.0, 0.0), &vel)
            .unwrap());
    }

    #[test]
    fn test_yaw_outside_tolerance_not_reached() {
        let (mut checker, _params) = initialized_checker();
        let goal = Pose2D::identity();
        let vel = Twist2D::zero();

        assert!(!checker
            .is_goal_reached(&Pose2D::new(0.1, 0.0, 0.5), &goal, &vel)
            .unwrap());
    }

    #[test]
    fn test_xy_only_ignores_yaw() {
        let params = ParameterStore::new();
        let mut checker = SimpleGoalChecker::xy_only();
        checker.initialize(&params, "goal_checker").unwrap();

        let goal = Pose2D::identity();
        assert!(checker
            .is_goal_reached(&Pose2D::new(0.1, 0.0, 3.0), &goal, &Twist2D::zero())
            .unwrap());
    }

    #[test]
    fn test_latch_is_sticky_until_reset() {
        let (mut checker, _params) = initialized_checker();
        let goal = Pose2D::identity();
        let vel = Twist2D::zero();
        let far = Pose2D::new(5.0, 5.0, 3.0);

        assert!(checker
            .is_goal_reached(&Pose2D::new(0.2, 0.1, 0.1), &goal, &vel)
            .unwrap());
        assert!(checker.is_goal_reached(&far, &goal, &vel).unwrap());

        checker.reset();
        assert!(!checker.is_goal_reached(&far, &goal, &vel).unwrap());
    }

    #[test]
    fn test_non_stateful_tracks_instantaneous_check() {
        let params = ParameterStore::new();
        params.seed("goal_checker.stateful", ParamValue::Bool(false));
        let mut checker = SimpleGoalChecker::new();
        checker.initialize(&params, "goal_checker").unwrap();

        let goal = Pose2D::identity();
        let vel = Twist2D::zero();
        let near = Pose2D::new(0.1, 0.0, 0.0);
        let far = Pose2D::new(5.0, 5.0, 0.0);

        assert!(checker.is_goal_reached(&near, &goal, &vel).unwrap());
        assert!(!checker.is_goal_reached(&far, &goal, &vel).unwrap());
        assert!(checker.is_goal_reached(&near, &goal, &vel).unwrap());
    }

    #[test]
    fn test_repeated_calls_are_idempotent() {
        let (mut checker, _params) = initialized_checker();
        let goal = Pose2D::identity();
        let pose = Pose2D::new(0.3, 0.0, 0.0);
        let vel = Twist2D::zero();

        let first = checker.is_goal_reached(&pose, &goal, &vel).unwrap();
        for _ in 0..10 {
            assert_eq!(checker.is_goal_reached(&pose, &goal, &vel).unwrap(), first);
        }
    }

    #[test]
    fn test_runtime_update_changes_decision() {
        let (mut checker, params) = initialized_checker();
        let goal = Pose2D::identity();
        let pose = Pose2D::new(0.4, 0.0, 0.0);
        let vel = Twist2D::zero();

        assert!(!checker.is_goal_reached(&pose, &goal, &vel).unwrap());

        params
            .set("goal_checker.xy_goal_tolerance", ParamValue::Float(0.5))
            .unwrap();
        assert!(checker.is_goal_reached(&pose, &goal, &vel).unwrap());

        let tol = checker.get_tolerances().unwrap();
        assert_eq!(tol.pose.x, 0.5);
    }

    #[test]
    fn test_invalid_update_keeps_prior_tolerances() {
        let (checker, params) = initialized_checker();

        let err = params
            .set("goal_checker.xy_goal_tolerance", ParamValue::Float(-1.0))
            .unwrap_err();
        assert!(matches!(err, LakshyaError::Config(_)));

        let tol = checker.get_tolerances().unwrap();
        assert_eq!(tol.pose.x, DEFAULT_XY_GOAL_TOLERANCE);
    }

    #[test]
    fn test_reinitialize_replaces_registrations() {
        let (mut checker, params) = initialized_checker();
        checker.initialize(&params, "goal_checker").unwrap();
        checker.initialize(&params, "goal_checker").unwrap();

        // The freshest snapshot handle is the registered one; updates still
        // land on the checker and only once.
        params
            .set("goal_checker.xy_goal_tolerance", ParamValue::Float(0.5))
            .unwrap();
        let tol = checker.get_tolerances().unwrap();
        assert_eq!(tol.pose.x, 0.5);
    }

    #[test]
    fn test_unrecognized_parameter_is_ignored() {
        let (checker, params) = initialized_checker();

        params
            .set("goal_checker.unrelated_setting", ParamValue::Float(-7.0))
            .unwrap();
        params.set("other_plugin.xy_goal_tolerance", ParamValue::Float(9.0)).unwrap();

        let tol = checker.get_tolerances().unwrap();
        assert_eq!(tol.pose.x, DEFAULT_XY_GOAL_TOLERANCE);
    }
}
