//! Lakshya - goal-arrival checking for mobile robot local controllers
//!
//! A local trajectory controller drives the robot toward a goal pose and,
//! once per control cycle, asks one question: is this goal reached now?
//! Lakshya answers it in bounded time with no blocking I/O, which is what
//! a control loop running at tens of Hz needs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    checker/                         │  ← Goal checking
//! │      (GoalChecker trait, simple, stopped)           │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    params/                          │  ← Live parameters
//! │   (ParameterStore, tolerance snapshots, publish)    │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                 (types, math)                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use lakshya::{create_goal_checker, GoalChecker, ParameterStore, Pose2D, Twist2D};
//!
//! let params = ParameterStore::new();
//! let mut checker = create_goal_checker("simple_goal_checker").unwrap();
//! checker.initialize(&params, "goal_checker").unwrap();
//!
//! let goal = Pose2D::new(1.0, 1.0, 0.0);
//! checker.reset(); // new goal issued
//! let arrived = checker
//!     .is_goal_reached(&Pose2D::new(0.9, 1.0, 0.1), &goal, &Twist2D::zero())
//!     .unwrap();
//! assert!(arrived);
//! ```
//!
//! # Concurrency
//!
//! The control loop owns the checker and calls it serially. Tolerance
//! parameters may change at any time from another thread through
//! [`ParameterStore::set`]; changes are validated, then published as a
//! complete copy-on-write snapshot, so an evaluation never observes a
//! torn mix of old and new values.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Errors and configuration
// ============================================================================
pub mod config;
pub mod error;

// ============================================================================
// Layer 3: Parameter handling (depends on core, error)
// ============================================================================
pub mod params;

// ============================================================================
// Layer 4: Goal checkers (depends on all layers)
// ============================================================================
pub mod checker;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math;
pub use crate::core::types::{Point2D, Pose2D, Twist2D};

// Errors
pub use crate::error::{LakshyaError, Result};

// Configuration
pub use crate::config::CheckerConfig;

// Parameters
pub use crate::params::{
    ParamValue, ParameterStore, SharedTolerances, SharedVelocityTolerances, ToleranceConfig,
    VelocityTolerances,
};

// Checkers
pub use crate::checker::{
    create_goal_checker, GoalChecker, GoalTolerances, SimpleGoalChecker, StoppedGoalChecker,
};
