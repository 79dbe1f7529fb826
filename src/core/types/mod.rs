//! Core data types.
//!
//! - [`Point2D`]: 2D point in meters
//! - [`Pose2D`]: 2D pose (position + heading)
//! - [`Twist2D`]: 2D velocity (linear and angular)

mod pose;
mod twist;

pub use pose::{Point2D, Pose2D};
pub use twist::Twist2D;
