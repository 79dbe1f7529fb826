//! Runtime parameter store.
//!
//! Models the hosting framework's parameter interface: the host seeds
//! initial values at startup, a goal checker declares the parameters it
//! recognizes during `initialize`, and later changes arrive through
//! [`ParameterStore::set`], possibly from a different thread than the
//! control loop.
//!
//! A `set` call first runs every registered validator; rejection leaves the
//! stored value untouched and is returned to the caller, never propagated
//! into the control loop. Accepted values are stored and then delivered to
//! every registered update observer.

mod tolerance;

pub use tolerance::{
    SharedConfig, SharedTolerances, SharedVelocityTolerances, ToleranceConfig,
    VelocityTolerances, DEFAULT_ROT_STOPPED_VELOCITY, DEFAULT_STATEFUL,
    DEFAULT_TRANS_STOPPED_VELOCITY, DEFAULT_XY_GOAL_TOLERANCE, DEFAULT_YAW_GOAL_TOLERANCE,
};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;

/// A dynamically typed parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// Floating point parameter (tolerances, thresholds).
    Float(f32),
    /// Boolean parameter (flags).
    Bool(bool),
}

impl ParamValue {
    /// Get the float value, if this is a float parameter.
    #[inline]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Bool(_) => None,
        }
    }

    /// Get the boolean value, if this is a boolean parameter.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Float(_) => None,
            ParamValue::Bool(v) => Some(*v),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Validation callback: may reject a pending change before it is stored.
type ValidateFn = Box<dyn Fn(&str, &ParamValue) -> Result<()> + Send + Sync>;
/// Update callback: notified after a change has been stored.
type UpdateFn = Box<dyn Fn(&str, &ParamValue) + Send + Sync>;

/// Thread-safe parameter store with validation and change notification.
///
/// Cloning is cheap and clones share the same underlying state, so the
/// host can hand one handle to the control loop and call [`set`] on
/// another from its configuration thread.
///
/// [`set`]: ParameterStore::set
#[derive(Clone, Default)]
pub struct ParameterStore {
    values: Arc<RwLock<HashMap<String, ParamValue>>>,
    validators: Arc<RwLock<HashMap<String, ValidateFn>>>,
    observers: Arc<RwLock<HashMap<String, UpdateFn>>>,
}

impl ParameterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an initial value without running validators or observers.
    ///
    /// Host-side startup path: values loaded from configuration land here
    /// before any checker is initialized.
    pub fn seed(&self, name: impl Into<String>, value: ParamValue) {
        self.values.write().insert(name.into(), value);
    }

    /// Declare a parameter with its default value.
    ///
    /// Keeps any value already seeded by the host; the default only fills
    /// the gap when the host supplied nothing.
    pub fn declare(&self, name: impl Into<String>, default: ParamValue) {
        self.values.write().entry(name.into()).or_insert(default);
    }

    /// Read the current value of a parameter.
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.values.read().get(name).copied()
    }

    /// Apply a parameter change.
    ///
    /// Runs every registered validator first; the first rejection is
    /// returned to the caller and the stored value stays untouched. On
    /// success the value is stored and every update observer is notified
    /// on the calling thread.
    pub fn set(&self, name: &str, value: ParamValue) -> Result<()> {
        {
            let validators = self.validators.read();
            for validate in validators.values() {
                if let Err(e) = validate(name, &value) {
                    log::warn!("Rejected parameter change {} = {}: {}", name, value, e);
                    return Err(e);
                }
            }
        }

        self.values.write().insert(name.to_string(), value);

        let observers = self.observers.read();
        for notify in observers.values() {
            notify(name, &value);
        }
        Ok(())
    }

    /// Register a validation callback under `key`.
    ///
    /// Registering again under the same key replaces the previous
    /// callback, so a checker that is initialized again does not leave
    /// stale registrations behind.
    pub fn on_validate<F>(&self, key: impl Into<String>, callback: F)
    where
        F: Fn(&str, &ParamValue) -> Result<()> + Send + Sync + 'static,
    {
        self.validators.write().insert(key.into(), Box::new(callback));
    }

    /// Register an update observer under `key`.
    ///
    /// Same replacement semantics as [`on_validate`].
    ///
    /// [`on_validate`]: ParameterStore::on_validate
    pub fn on_update<F>(&self, key: impl Into<String>, callback: F)
    where
        F: Fn(&str, &ParamValue) + Send + Sync + 'static,
    {
        self.observers.write().insert(key.into(), Box::new(callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LakshyaError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_declare_keeps_seeded_value() {
        let store = ParameterStore::new();
        store.seed("checker.xy_goal_tolerance", ParamValue::Float(0.5));
        store.declare("checker.xy_goal_tolerance", ParamValue::Float(0.25));
        store.declare("checker.stateful", ParamValue::Bool(true));

        assert_eq!(
            store.get("checker.xy_goal_tolerance"),
            Some(ParamValue::Float(0.5))
        );
        assert_eq!(store.get("checker.stateful"), Some(ParamValue::Bool(true)));
    }

    #[test]
    fn test_set_runs_validators() {
        let store = ParameterStore::new();
        store.seed("tol", ParamValue::Float(1.0));
        store.on_validate("tol_guard", |name, value| {
            if name == "tol" && value.as_float().is_some_and(|v| v < 0.0) {
                return Err(LakshyaError::Config("negative".to_string()));
            }
            Ok(())
        });

        assert!(store.set("tol", ParamValue::Float(-1.0)).is_err());
        assert_eq!(store.get("tol"), Some(ParamValue::Float(1.0)));

        assert!(store.set("tol", ParamValue::Float(2.0)).is_ok());
        assert_eq!(store.get("tol"), Some(ParamValue::Float(2.0)));
    }

    #[test]
    fn test_observers_fire_after_store() {
        let store = ParameterStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        store.on_update("flag_watch", move |name, value| {
            if name == "flag" && value.as_bool() == Some(true) {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        store.set("flag", ParamValue::Bool(true)).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejected_change_does_not_notify() {
        let store = ParameterStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        store.on_validate("veto", |_, _| Err(LakshyaError::Config("always".to_string())));
        store.on_update("watch", move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert!(store.set("anything", ParamValue::Float(1.0)).is_err());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reregistering_key_replaces_callback() {
        let store = ParameterStore::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let seen = Arc::clone(&count);
            store.on_update("watch", move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        store.set("tol", ParamValue::Float(1.0)).unwrap();
        // One registered observer fires once, not three times
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
