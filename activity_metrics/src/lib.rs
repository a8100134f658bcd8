//! # Activity metrics
//!
//! Derive calories and distance from a cumulative step count using fixed
//! per-step constants:
//!
//! ```notrust
//! calories    = floor(steps * 0.04)          (kcal)
//! distance_km = steps * 0.762 / 1000         (rounded to 2 decimals)
//! ```
//!
//! Both are pure functions of the step count and carry no state of their
//! own; the tracker recomputes them on every step event.

/// Average energy burnt per step in kcal.
pub const CALORIES_PER_STEP: f64 = 0.04;

/// Average step length in meters.
pub const STEP_LENGTH_M: f64 = 0.762;

/// Burnt calories for a step count, floored to whole kcal.
#[inline]
pub fn calories(steps: u64) -> u64 {
    (steps as f64 * CALORIES_PER_STEP).floor() as u64
}

/// Covered distance in kilometers, rounded to 2 decimal places.
#[inline]
pub fn distance_km(steps: u64) -> f64 {
    (steps as f64 * STEP_LENGTH_M / 1000.0 * 100.0).round() / 100.0
}

/// Snapshot of all step-derived metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivityMetrics {
    pub steps: u64,
    pub calories: u64,
    pub distance_km: f64,
}

impl ActivityMetrics {
    pub fn from_steps(steps: u64) -> Self {
        Self {
            steps,
            calories: calories(steps),
            distance_km: distance_km(steps),
        }
    }
}

impl From<u64> for ActivityMetrics {
    fn from(steps: u64) -> Self {
        Self::from_steps(steps)
    }
}
