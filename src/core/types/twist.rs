//! Velocity types.

use serde::{Deserialize, Serialize};

/// 2D velocity: linear components in m/s, angular in rad/s.
///
/// `linear_y` is zero for differential-drive bases but carried so
/// holonomic platforms can report lateral motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Twist2D {
    /// Forward linear velocity (m/s)
    pub linear_x: f32,
    /// Lateral linear velocity (m/s)
    pub linear_y: f32,
    /// Angular velocity (rad/s)
    pub angular: f32,
}

impl Twist2D {
    /// Create a new twist.
    #[inline]
    pub fn new(linear_x: f32, linear_y: f32, angular: f32) -> Self {
        Self {
            linear_x,
            linear_y,
            angular,
        }
    }

    /// Zero velocity.
    #[inline]
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Magnitude of the linear velocity (m/s).
    #[inline]
    pub fn linear_speed(&self) -> f32 {
        self.linear_x.hypot(self.linear_y)
    }
}

impl Default for Twist2D {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_twist() {
        let t = Twist2D::zero();
        assert_eq!(t.linear_speed(), 0.0);
        assert_eq!(t.angular, 0.0);
    }

    #[test]
    fn test_linear_speed() {
        let t = Twist2D::new(0.3, 0.4, 1.0);
        assert_relative_eq!(t.linear_speed(), 0.5);
    }
}
