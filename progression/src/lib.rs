//! # Progression ledger
//!
//! Owns the reward state of the step counter: coins, experience/level,
//! daily streak and achievement unlocks.
//!
//! Gamification formulas:
//!
//! ```notrust
//! experience = floor(lifetime_steps * 0.01)
//! level      = experience / 100 + 1
//! ```
//!
//! Level-ups pay `level * 50` coins, every 7th consecutive active day pays
//! a flat 100-coin bonus, achievements pay their own one-time reward.
//! Every rule application is surfaced as a [`RewardEvent`] so a
//! presentation layer can animate it; the ledger itself is UI-free.
//!
//! Experience is driven by a lifetime step counter that only ever grows,
//! so refreshing a session never makes the level inconsistent with the
//! visible step count.

use std::collections::BTreeSet;

use activity_metrics::ActivityMetrics;
use time::Date;

mod achievements;

pub use self::achievements::*;

pub const EXPERIENCE_PER_STEP: f64 = 0.01;
pub const EXPERIENCE_PER_LEVEL: u64 = 100;
/// Coins paid per level reached on a level-up.
pub const LEVEL_UP_COINS: u64 = 50;
pub const STREAK_BONUS_COINS: u64 = 100;
pub const STREAK_BONUS_INTERVAL_DAYS: u64 = 7;

/// A discrete reward surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RewardEvent {
    AchievementUnlocked {
        id: u32,
        title: &'static str,
        coins: u64,
    },
    LevelUp {
        level: u64,
        coins: u64,
    },
    StreakBonus {
        days: u64,
        coins: u64,
    },
}

impl RewardEvent {
    pub const fn coins(&self) -> u64 {
        match self {
            Self::AchievementUnlocked { coins, .. }
            | Self::LevelUp { coins, .. }
            | Self::StreakBonus { coins, .. } => *coins,
        }
    }
}

/// Persistent reward state, loaded once at startup and mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub coins: u64,
    pub experience: u64,
    pub level: u64,
    pub streak_days: u64,
    pub last_active: Option<Date>,
    /// Never grows smaller, never shrinks on session refresh.
    pub lifetime_steps: u64,
    /// Ids unlock exactly once and are never removed.
    pub completed_achievements: BTreeSet<u32>,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            coins: 0,
            experience: 0,
            level: 1,
            streak_days: 0,
            last_active: None,
            lifetime_steps: 0,
            completed_achievements: BTreeSet::new(),
        }
    }
}

impl Progression {
    /// Apply a metrics change, evaluating achievements first, then
    /// experience/level. Order is fixed; each coin award yields one event.
    pub fn apply_metrics(
        &mut self,
        metrics: &ActivityMetrics,
        step_delta: u64,
        catalog: &[Achievement],
    ) -> Vec<RewardEvent> {
        self.lifetime_steps += step_delta;

        let mut events = self.unlock_achievements(metrics, catalog);

        if let Some(level_up) = self.gain_experience() {
            events.push(level_up);
        }

        events
    }

    /// Unlock every not-yet-completed achievement whose threshold the
    /// session metrics reached. Achievements are independent; several may
    /// unlock in one pass.
    fn unlock_achievements(
        &mut self,
        metrics: &ActivityMetrics,
        catalog: &[Achievement],
    ) -> Vec<RewardEvent> {
        let mut events = Vec::new();

        for achievement in catalog {
            if self.completed_achievements.contains(&achievement.id)
                || !achievement.is_reached(metrics)
            {
                continue;
            }

            self.completed_achievements.insert(achievement.id);
            self.coins += achievement.coin_reward;

            events.push(RewardEvent::AchievementUnlocked {
                id: achievement.id,
                title: achievement.title,
                coins: achievement.coin_reward,
            });
        }

        events
    }

    /// Recompute experience and level from lifetime steps. Level never
    /// decreases; a level increase pays `level * 50` coins once.
    fn gain_experience(&mut self) -> Option<RewardEvent> {
        self.experience = (self.lifetime_steps as f64 * EXPERIENCE_PER_STEP).floor() as u64;

        let level = self.experience / EXPERIENCE_PER_LEVEL + 1;
        if level <= self.level {
            return None;
        }

        self.level = level;
        let coins = level * LEVEL_UP_COINS;
        self.coins += coins;

        Some(RewardEvent::LevelUp { level, coins })
    }

    /// Evaluate the daily streak on the first activity of `today`.
    ///
    /// Consecutive calendar days grow the streak by one, any gap resets it
    /// to zero, and every 7th consecutive day pays a flat bonus. A second
    /// call on the same day is a no-op.
    pub fn record_activity(&mut self, today: Date) -> Option<RewardEvent> {
        let last_active = self.last_active.replace(today);

        let last_active = match last_active {
            Some(date) if date == today => return None,
            Some(date) => date,
            // First run ever, nothing to compare against.
            None => return None,
        };

        if Some(last_active) == today.previous_day() {
            self.streak_days += 1;
        } else {
            self.streak_days = 0;
            return None;
        }

        if self.streak_days % STREAK_BONUS_INTERVAL_DAYS != 0 {
            return None;
        }

        self.coins += STREAK_BONUS_COINS;

        Some(RewardEvent::StreakBonus {
            days: self.streak_days,
            coins: STREAK_BONUS_COINS,
        })
    }
}
