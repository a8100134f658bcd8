/// Which derived metric an achievement threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    Steps,
    Calories,
    Distance,
}

/// A one-time threshold reward on steps, calories or distance.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Achievement {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub metric: Metric,
    pub threshold: f64,
    pub coin_reward: u64,
}

/// The built-in catalog.
pub const CATALOG: [Achievement; 5] = [
    Achievement {
        id: 1,
        title: "First Steps",
        description: "Complete your first 1,000 steps",
        metric: Metric::Steps,
        threshold: 1_000.0,
        coin_reward: 50,
    },
    Achievement {
        id: 2,
        title: "Walking Warrior",
        description: "Reach 5,000 steps in one session",
        metric: Metric::Steps,
        threshold: 5_000.0,
        coin_reward: 100,
    },
    Achievement {
        id: 3,
        title: "Step Master",
        description: "Complete your daily goal of 10,000 steps",
        metric: Metric::Steps,
        threshold: 10_000.0,
        coin_reward: 200,
    },
    Achievement {
        id: 4,
        title: "Calorie Crusher",
        description: "Burn 200 calories in one session",
        metric: Metric::Calories,
        threshold: 200.0,
        coin_reward: 150,
    },
    Achievement {
        id: 5,
        title: "Distance Champion",
        description: "Walk 5 kilometers in one session",
        metric: Metric::Distance,
        threshold: 5.0,
        coin_reward: 300,
    },
];

impl Achievement {
    /// Value of this achievement's metric in a snapshot.
    pub fn metric_value(&self, metrics: &activity_metrics::ActivityMetrics) -> f64 {
        match self.metric {
            Metric::Steps => metrics.steps as f64,
            Metric::Calories => metrics.calories as f64,
            Metric::Distance => metrics.distance_km,
        }
    }

    pub fn is_reached(&self, metrics: &activity_metrics::ActivityMetrics) -> bool {
        self.metric_value(metrics) >= self.threshold
    }
}
