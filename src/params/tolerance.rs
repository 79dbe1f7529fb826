//! Tolerance snapshots and their copy-on-write publication.
//!
//! The control loop reads tolerances at tens of Hz while a configuration
//! thread may change them at any time. Updates never mutate a published
//! snapshot in place: a new, fully validated [`ToleranceConfig`] is built
//! and swapped in as a unit, so a reader can never observe a torn mix of
//! old and new values (e.g. a tolerance paired with a stale cached square).

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::types::Twist2D;
use crate::error::{LakshyaError, Result};

/// Default xy goal tolerance (meters).
pub const DEFAULT_XY_GOAL_TOLERANCE: f32 = 0.25;
/// Default yaw goal tolerance (radians).
pub const DEFAULT_YAW_GOAL_TOLERANCE: f32 = 0.25;
/// Default stateful flag.
pub const DEFAULT_STATEFUL: bool = true;
/// Default translational stopped-velocity threshold (m/s).
pub const DEFAULT_TRANS_STOPPED_VELOCITY: f32 = 0.25;
/// Default rotational stopped-velocity threshold (rad/s).
pub const DEFAULT_ROT_STOPPED_VELOCITY: f32 = 0.25;

/// Pose tolerances for goal checking.
///
/// Immutable once constructed; every construction path, including
/// deserialization, goes through [`ToleranceConfig::new`], which keeps
/// `xy_goal_tolerance_sq` in lockstep with `xy_goal_tolerance` in every
/// snapshot that can ever be observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawToleranceConfig")]
pub struct ToleranceConfig {
    xy_goal_tolerance: f32,
    xy_goal_tolerance_sq: f32,
    yaw_goal_tolerance: f32,
    stateful: bool,
    check_xy_only: bool,
}

impl ToleranceConfig {
    /// Build a validated tolerance snapshot.
    ///
    /// Rejects negative tolerances with [`LakshyaError::Config`].
    pub fn new(
        xy_goal_tolerance: f32,
        yaw_goal_tolerance: f32,
        stateful: bool,
        check_xy_only: bool,
    ) -> Result<Self> {
        if xy_goal_tolerance.is_nan() || xy_goal_tolerance < 0.0 {
            return Err(LakshyaError::Config(format!(
                "xy_goal_tolerance must be non-negative, got {}",
                xy_goal_tolerance
            )));
        }
        if yaw_goal_tolerance.is_nan() || yaw_goal_tolerance < 0.0 {
            return Err(LakshyaError::Config(format!(
                "yaw_goal_tolerance must be non-negative, got {}",
                yaw_goal_tolerance
            )));
        }
        Ok(Self {
            xy_goal_tolerance,
            xy_goal_tolerance_sq: xy_goal_tolerance * xy_goal_tolerance,
            yaw_goal_tolerance,
            stateful,
            check_xy_only,
        })
    }

    /// XY goal tolerance (meters).
    #[inline]
    pub fn xy_goal_tolerance(&self) -> f32 {
        self.xy_goal_tolerance
    }

    /// Cached square of the xy goal tolerance.
    #[inline]
    pub fn xy_goal_tolerance_sq(&self) -> f32 {
        self.xy_goal_tolerance_sq
    }

    /// Yaw goal tolerance (radians).
    #[inline]
    pub fn yaw_goal_tolerance(&self) -> f32 {
        self.yaw_goal_tolerance
    }

    /// Whether the reached latch is sticky until reset.
    #[inline]
    pub fn stateful(&self) -> bool {
        self.stateful
    }

    /// Whether the xy check alone decides arrival (yaw ignored).
    #[inline]
    pub fn check_xy_only(&self) -> bool {
        self.check_xy_only
    }

    /// Copy of this snapshot with a different xy tolerance.
    pub fn with_xy_goal_tolerance(&self, xy: f32) -> Result<Self> {
        Self::new(xy, self.yaw_goal_tolerance, self.stateful, self.check_xy_only)
    }

    /// Copy of this snapshot with a different yaw tolerance.
    pub fn with_yaw_goal_tolerance(&self, yaw: f32) -> Result<Self> {
        Self::new(self.xy_goal_tolerance, yaw, self.stateful, self.check_xy_only)
    }

    /// Copy of this snapshot with a different stateful flag.
    pub fn with_stateful(&self, stateful: bool) -> Result<Self> {
        Self::new(
            self.xy_goal_tolerance,
            self.yaw_goal_tolerance,
            stateful,
            self.check_xy_only,
        )
    }
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            xy_goal_tolerance: DEFAULT_XY_GOAL_TOLERANCE,
            xy_goal_tolerance_sq: DEFAULT_XY_GOAL_TOLERANCE * DEFAULT_XY_GOAL_TOLERANCE,
            yaw_goal_tolerance: DEFAULT_YAW_GOAL_TOLERANCE,
            stateful: DEFAULT_STATEFUL,
            check_xy_only: false,
        }
    }
}

/// Wire shape for [`ToleranceConfig`] deserialization.
///
/// Carries only the independent fields; the cached square is recomputed
/// and the values re-validated by [`ToleranceConfig::new`] in `TryFrom`,
/// so deserialization cannot smuggle in an inconsistent snapshot.
#[derive(Deserialize)]
struct RawToleranceConfig {
    #[serde(default = "default_xy_goal_tolerance")]
    xy_goal_tolerance: f32,
    #[serde(default = "default_yaw_goal_tolerance")]
    yaw_goal_tolerance: f32,
    #[serde(default = "default_stateful")]
    stateful: bool,
    #[serde(default)]
    check_xy_only: bool,
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

impl TryFrom<RawToleranceConfig> for ToleranceConfig {
    type Error = LakshyaError;

    fn try_from(raw: RawToleranceConfig) -> Result<Self> {
        Self::new(
            raw.xy_goal_tolerance,
            raw.yaw_goal_tolerance,
            raw.stateful,
            raw.check_xy_only,
        )
    }
}

/// Stopped-velocity thresholds for the stopped goal checker variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVelocityTolerances")]
pub struct VelocityTolerances {
    trans_stopped_velocity: f32,
    rot_stopped_velocity: f32,
}

impl VelocityTolerances {
    /// Build validated stopped-velocity thresholds.
    pub fn new(trans_stopped_velocity: f32, rot_stopped_velocity: f32) -> Result<Self> {
        if trans_stopped_velocity.is_nan() || trans_stopped_velocity < 0.0 {
            return Err(LakshyaError::Config(format!(
                "trans_stopped_velocity must be non-negative, got {}",
                trans_stopped_velocity
            )));
        }
        if rot_stopped_velocity.is_nan() || rot_stopped_velocity < 0.0 {
            return Err(LakshyaError::Config(format!(
                "rot_stopped_velocity must be non-negative, got {}",
                rot_stopped_velocity
            )));
        }
        Ok(Self {
            trans_stopped_velocity,
            rot_stopped_velocity,
        })
    }

    /// Translational threshold (m/s).
    #[inline]
    pub fn trans_stopped_velocity(&self) -> f32 {
        self.trans_stopped_velocity
    }

    /// Rotational threshold (rad/s).
    #[inline]
    pub fn rot_stopped_velocity(&self) -> f32 {
        self.rot_stopped_velocity
    }

    /// Whether the given twist counts as stopped.
    #[inline]
    pub fn is_stopped(&self, velocity: &Twist2D) -> bool {
        velocity.angular.abs() <= self.rot_stopped_velocity
            && velocity.linear_speed() <= self.trans_stopped_velocity
    }

    /// Copy with a different translational threshold.
    pub fn with_trans_stopped_velocity(&self, trans: f32) -> Result<Self> {
        Self::new(trans, self.rot_stopped_velocity)
    }

    /// Copy with a different rotational threshold.
    pub fn with_rot_stopped_velocity(&self, rot: f32) -> Result<Self> {
        Self::new(self.trans_stopped_velocity, rot)
    }
}

impl Default for VelocityTolerances {
    fn default() -> Self {
        Self {
            trans_stopped_velocity: DEFAULT_TRANS_STOPPED_VELOCITY,
            rot_stopped_velocity: DEFAULT_ROT_STOPPED_VELOCITY,
        }
    }
}

/// Wire shape for [`VelocityTolerances`] deserialization; re-validated
/// by [`VelocityTolerances::new`] in `TryFrom`.
#[derive(Deserialize)]
struct RawVelocityTolerances {
    #[serde(default = "default_trans_stopped_velocity")]
    trans_stopped_velocity: f32,
    #[serde(default = "default_rot_stopped_velocity")]
    rot_stopped_velocity: f32,
}

fn default_trans_stopped_velocity() -> f32 {
    DEFAULT_TRANS_STOPPED_VELOCITY
}
fn default_rot_stopped_velocity() -> f32 {
    DEFAULT_ROT_STOPPED_VELOCITY
}

impl TryFrom<RawVelocityTolerances> for VelocityTolerances {
    type Error = LakshyaError;

    fn try_from(raw: RawVelocityTolerances) -> Result<Self> {
        Self::new(raw.trans_stopped_velocity, raw.rot_stopped_velocity)
    }
}

/// Atomically published configuration snapshot shared between threads.
///
/// `publish` swaps the inner `Arc` as a unit under a short write lock;
/// `snapshot` clones the inner `Arc` under a read lock. Neither side ever
/// holds a lock across a computation, and a snapshot taken before a publish
/// stays valid and self-consistent for as long as the caller keeps it.
#[derive(Debug, Clone)]
pub struct SharedConfig<T> {
    inner: Arc<RwLock<Arc<T>>>,
}

impl<T> SharedConfig<T> {
    /// Publish an initial snapshot.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Take the currently published snapshot.
    #[inline]
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.inner.read())
    }

    /// Replace the published snapshot as a unit.
    pub fn publish(&self, next: T) {
        *self.inner.write() = Arc::new(next);
    }
}

/// Shared pose tolerances.
pub type SharedTolerances = SharedConfig<ToleranceConfig>;
/// Shared stopped-velocity thresholds.
pub type SharedVelocityTolerances = SharedConfig<VelocityTolerances>;
