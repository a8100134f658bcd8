//! # Tracker
//!
//! Session engine gluing the step counter together: accelerometer samples
//! go through the [`step_detection`] detector, every accepted step refreshes
//! the derived [`activity_metrics`] snapshot and runs the [`progression`]
//! ledger, and the result is persisted through a [`progress_store`] backend.
//!
//! Everything runs synchronously on the caller's timeline (one periodic
//! sensor callback), so no state is ever mutated concurrently. Persistence
//! is best-effort: a failed write is logged and swallowed, the in-memory
//! state stays authoritative for the session.
//!
//! The engine is presentation-free. Each call returns the discrete
//! [`TrackerEvent`]s produced so a UI can subscribe and animate them.

use activity_metrics::ActivityMetrics;
use progress_store::{ProgressRecord, ProgressStore};
use progression::{Achievement, CATALOG, Progression, RewardEvent};
use step_detection::{Accelerometer, StepDetector};
use time::{Date, OffsetDateTime};

/// A discrete outcome of feeding one sample, for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// A step was accepted; carries the refreshed session metrics.
    Step(ActivityMetrics),
    Reward(RewardEvent),
}

/// One user's step counter: session state plus the persistent ledger.
#[derive(Debug)]
pub struct Tracker<S> {
    detector: StepDetector,
    metrics: ActivityMetrics,
    progression: Progression,
    catalog: Vec<Achievement>,
    store: S,
    tracking: bool,
}

impl<S: ProgressStore> Tracker<S> {
    /// Restore state from the store, defaulting everything on first run.
    ///
    /// A load failure is logged and treated as a first run.
    pub fn new(store: S) -> Self {
        Self::with_catalog(store, CATALOG.to_vec())
    }

    pub fn with_catalog(store: S, catalog: Vec<Achievement>) -> Self {
        let record = match store.load() {
            Ok(record) => record.unwrap_or_default(),
            Err(err) => {
                log::warn!("failed to load progress, starting fresh: {err}");
                ProgressRecord::default()
            }
        };

        Self {
            detector: StepDetector::new(),
            metrics: ActivityMetrics::from_steps(record.steps),
            progression: Progression {
                coins: record.coins,
                experience: record.experience,
                level: record.level.max(1),
                streak_days: record.streak,
                last_active: record.last_active_date,
                lifetime_steps: record.lifetime_steps,
                completed_achievements: record.completed_achievements.into_iter().collect(),
            },
            catalog,
            store,
            tracking: false,
        }
    }

    pub fn metrics(&self) -> ActivityMetrics {
        self.metrics
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub const fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Begin a fresh tracking session, zeroing all session counters.
    pub fn start(&mut self) {
        self.detector.reset();
        self.metrics = ActivityMetrics::default();
        self.tracking = true;
        self.persist();
    }

    /// Stop accepting samples. Idempotent, safe to call when stopped.
    pub fn stop(&mut self) {
        self.detector.reset();
        self.tracking = false;
    }

    /// Zero the session counters on explicit user request, keeping the
    /// ledger (coins, level, streak, unlocks) intact.
    pub fn refresh(&mut self) {
        self.detector.reset();
        self.metrics = ActivityMetrics::default();
        self.persist();
    }

    /// Evaluate the daily streak for `today`. Call on startup and on the
    /// first sample of a new calendar day.
    pub fn check_streak(&mut self, today: Date) -> Option<RewardEvent> {
        let event = self.progression.record_activity(today);
        self.persist();

        event
    }

    /// Feed one accelerometer sample. Returns every event it produced,
    /// in order: the step itself, then unlocks, then a level-up.
    pub fn on_sample(&mut self, sample: Accelerometer) -> Vec<TrackerEvent> {
        if !self.tracking {
            return Vec::new();
        }

        let Some(step) = self.detector.update(sample) else {
            return Vec::new();
        };

        self.metrics = ActivityMetrics::from_steps(step.count);

        let rewards = self
            .progression
            .apply_metrics(&self.metrics, 1, &self.catalog);

        self.persist();

        let mut events = vec![TrackerEvent::Step(self.metrics)];
        events.extend(rewards.into_iter().map(TrackerEvent::Reward));

        events
    }

    /// Snapshot of everything the store persists.
    pub fn to_record(&self) -> ProgressRecord {
        ProgressRecord {
            steps: self.metrics.steps,
            calories: self.metrics.calories,
            distance: self.metrics.distance_km,
            coins: self.progression.coins,
            completed_achievements: self
                .progression
                .completed_achievements
                .iter()
                .copied()
                .collect(),
            streak: self.progression.streak_days,
            level: self.progression.level,
            experience: self.progression.experience,
            lifetime_steps: self.progression.lifetime_steps,
            last_active_date: self.progression.last_active,
            last_updated: Some(OffsetDateTime::now_utc()),
        }
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.to_record()) {
            log::warn!("failed to persist progress, keeping in-memory state: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use progress_store::{MemoryStore, StoreError};
    use time::macros::date;

    /// Store whose writes always fail, for §7 degradation behavior.
    #[derive(Debug, Default)]
    struct FailingStore;

    impl ProgressStore for FailingStore {
        fn load(&self) -> Result<Option<ProgressRecord>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk on fire")))
        }

        fn save(&self, _: &ProgressRecord) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk on fire")))
        }
    }

    fn sample(ms: u64, magnitude: f64) -> Accelerometer {
        Accelerometer {
            timestamp: Duration::from_millis(ms),
            x: magnitude,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Feed `steps` clean footfalls, 400 ms apart.
    fn walk<S: ProgressStore>(tracker: &mut Tracker<S>, steps: u64) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        let mut ms = 0;

        events.extend(tracker.on_sample(sample(ms, 9.81)));
        for _ in 0..steps {
            ms += 300;
            events.extend(tracker.on_sample(sample(ms, 11.0)));
            ms += 300;
            events.extend(tracker.on_sample(sample(ms, 9.81)));
        }

        events
    }

    #[test]
    fn fresh_tracker_counts_steps() {
        let mut tracker = Tracker::new(MemoryStore::new());
        tracker.start();

        let events = walk(&mut tracker, 3);

        assert_eq!(tracker.metrics().steps, 3);
        let steps = events
            .iter()
            .filter(|e| matches!(e, TrackerEvent::Step(_)))
            .count();
        assert_eq!(steps, 3);
    }

    #[test]
    fn samples_are_ignored_while_stopped() {
        let mut tracker = Tracker::new(MemoryStore::new());

        assert!(walk(&mut tracker, 3).is_empty());
        assert_eq!(tracker.metrics().steps, 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut tracker = Tracker::new(MemoryStore::new());
        tracker.start();
        walk(&mut tracker, 2);

        tracker.stop();
        let once = (tracker.metrics(), tracker.progression().clone());
        tracker.stop();
        assert_eq!((tracker.metrics(), tracker.progression().clone()), once);
    }

    #[test]
    fn steps_persist_after_every_mutation() {
        let store = MemoryStore::new();
        let mut tracker = Tracker::new(store);
        tracker.start();
        walk(&mut tracker, 2);

        let record = tracker.to_record();
        assert_eq!(record.steps, 2);
        assert_eq!(record.lifetime_steps, 2);
    }

    #[test]
    fn state_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");

        {
            let mut tracker = Tracker::new(progress_store::JsonFileStore::new(&path));
            tracker.start();
            walk(&mut tracker, 5);
        }

        let tracker = Tracker::new(progress_store::JsonFileStore::new(&path));
        assert_eq!(tracker.metrics().steps, 5);
        assert_eq!(tracker.progression().lifetime_steps, 5);
    }

    #[test]
    fn refresh_zeroes_session_but_not_ledger() {
        let catalog = vec![Achievement {
            id: 9,
            title: "Warmup",
            description: "Take 2 steps",
            metric: progression::Metric::Steps,
            threshold: 2.0,
            coin_reward: 10,
        }];
        let mut tracker = Tracker::with_catalog(MemoryStore::new(), catalog);
        tracker.start();
        walk(&mut tracker, 3);
        assert_eq!(tracker.progression().coins, 10);

        tracker.refresh();
        assert_eq!(tracker.metrics(), ActivityMetrics::default());
        assert_eq!(tracker.progression().coins, 10);
        assert_eq!(tracker.progression().lifetime_steps, 3);
        assert!(tracker.progression().completed_achievements.contains(&9));
    }

    #[test]
    fn achievement_unlocks_exactly_once_across_sessions() {
        let catalog = vec![Achievement {
            id: 9,
            title: "Warmup",
            description: "Take 2 steps",
            metric: progression::Metric::Steps,
            threshold: 2.0,
            coin_reward: 10,
        }];
        let mut tracker = Tracker::with_catalog(MemoryStore::new(), catalog);
        tracker.start();
        walk(&mut tracker, 3);

        // New session re-crosses the threshold from zero
        tracker.start();
        walk(&mut tracker, 3);
        assert_eq!(tracker.progression().coins, 10);
    }

    #[test]
    fn store_failures_are_swallowed() {
        let mut tracker = Tracker::new(FailingStore);
        tracker.start();
        walk(&mut tracker, 2);

        // In-memory state stays authoritative
        assert_eq!(tracker.metrics().steps, 2);
        assert_eq!(tracker.progression().lifetime_steps, 2);
    }

    #[test]
    fn streak_check_flows_through_to_the_record() {
        let mut tracker = Tracker::new(MemoryStore::new());

        assert_eq!(tracker.check_streak(date!(2026 - 08 - 28)), None);
        assert_eq!(tracker.check_streak(date!(2026 - 08 - 29)), None);

        let record = tracker.to_record();
        assert_eq!(record.streak, 1);
        assert_eq!(record.last_active_date, Some(date!(2026 - 08 - 29)));
    }

    #[test]
    fn level_restored_from_record_never_drops() {
        let store = MemoryStore::new();
        store
            .save(&ProgressRecord {
                level: 3,
                experience: 250,
                lifetime_steps: 25_000,
                ..ProgressRecord::default()
            })
            .unwrap();

        let mut tracker = Tracker::new(store);
        tracker.start();
        walk(&mut tracker, 1);

        assert_eq!(tracker.progression().level, 3);
    }
}
