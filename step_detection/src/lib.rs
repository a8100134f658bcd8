//! # Step detection
//!
//! Detect steps in an accelerometer stream using magnitude-delta peak
//! detection with hysteresis:
//!
//! ```notrust
//! magnitude = sqrt(x^2 + y^2 + z^2)
//! delta = magnitude - last_magnitude
//! ```
//!
//! A step is accepted when `delta` rises above [`RISE_THRESHOLD`], the
//! detector is not already latched on the current peak, and at least
//! [`MIN_STEP_INTERVAL`] passed since the last accepted step. The latch
//! is released once `delta` falls below `-RISE_THRESHOLD`, so one footfall
//! cycle produces at most one step. The debounce caps cadence at 5
//! steps/sec, a safe upper bound for human walking and running.

use std::time::Duration;

/// Rising-edge threshold in m/s², calibrated empirically.
pub const RISE_THRESHOLD: f64 = 0.5;

/// Debounce between accepted steps.
pub const MIN_STEP_INTERVAL: Duration = Duration::from_millis(200);

/// One 3-axis accelerometer reading in m/s².
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accelerometer {
    pub timestamp: Duration,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Accelerometer {
    #[inline]
    pub fn magnitude(&self) -> f64 {
        (self.x.powi(2) + self.y.powi(2) + self.z.powi(2)).sqrt()
    }
}

/// A single accepted footfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StepEvent {
    /// Cumulative step count for the session, including this step.
    pub count: u64,
    pub timestamp: Duration,
}

/// Streaming detector state. One per tracking session.
///
/// State must be [`reset`](Self::reset) between sessions, otherwise the
/// first sample after a gap produces a spurious huge delta.
#[derive(Debug, Clone, Default)]
pub struct StepDetector {
    step_count: u64,
    // 0 means "uninitialized", the first sample only primes this.
    last_magnitude: f64,
    last_step: Duration,
    latched: bool,
}

impl StepDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps accepted since the last reset.
    #[inline]
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Zero all state, arming the detector for a fresh session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one sample, returning an event when a step is accepted.
    pub fn update(&mut self, sample: Accelerometer) -> Option<StepEvent> {
        let magnitude = sample.magnitude();

        if self.last_magnitude == 0.0 {
            self.last_magnitude = magnitude;
            return None;
        }

        let delta = magnitude - self.last_magnitude;
        self.last_magnitude = magnitude;

        if delta > RISE_THRESHOLD {
            if !self.latched && sample.timestamp.saturating_sub(self.last_step) > MIN_STEP_INTERVAL
            {
                self.latched = true;
                self.last_step = sample.timestamp;
                self.step_count += 1;

                return Some(StepEvent {
                    count: self.step_count,
                    timestamp: sample.timestamp,
                });
            }
        } else if delta < -RISE_THRESHOLD {
            self.latched = false;
        }

        None
    }
}

/// Count steps over a whole recorded session.
pub fn steps_count(input: impl IntoIterator<Item = Accelerometer>) -> u64 {
    let mut detector = StepDetector::new();

    input
        .into_iter()
        .filter_map(|sample| detector.update(sample))
        .count() as u64
}
